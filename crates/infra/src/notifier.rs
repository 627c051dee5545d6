//! Best-effort fan-out after a write has committed.
//!
//! Each step (stored notification, email, realtime event) is attempted on its
//! own; a failure is logged at `warn` and never reaches the caller. Services
//! run the async methods on a spawned task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use jobboard_applications::Application;
use jobboard_auth::User;
use jobboard_core::{JobId, UserId};
use jobboard_events::{DomainEvent, EventBus, EventEnvelope};
use jobboard_jobs::Job;

use crate::mailer::{EmailMessage, MailError, Mailer};
use crate::notification::Notification;
use crate::store::{NotificationStore, UserStore};

pub const DEFAULT_EMAIL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Notifier {
    users: Arc<dyn UserStore>,
    notifications: Arc<dyn NotificationStore>,
    mailer: Arc<dyn Mailer>,
    bus: Arc<dyn EventBus<EventEnvelope>>,
    email_timeout: Duration,
}

impl Notifier {
    pub fn new(
        users: Arc<dyn UserStore>,
        notifications: Arc<dyn NotificationStore>,
        mailer: Arc<dyn Mailer>,
        bus: Arc<dyn EventBus<EventEnvelope>>,
        email_timeout: Duration,
    ) -> Self {
        Self {
            users,
            notifications,
            mailer,
            bus,
            email_timeout,
        }
    }

    pub fn bus(&self) -> &Arc<dyn EventBus<EventEnvelope>> {
        &self.bus
    }

    /// Tell the job's owner about a new application.
    pub async fn application_submitted(&self, application: Application, job: Job) {
        let candidate_name = match self.users.get(application.candidate_id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => "A candidate".to_string(),
            Err(err) => {
                warn!(error = %err, candidate_id = %application.candidate_id, "candidate lookup failed; using placeholder name");
                "A candidate".to_string()
            }
        };

        let employer = match self.users.get(job.posted_by).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(job_id = %job.id, employer_id = %job.posted_by, "job owner not found; skipping application notification");
                return;
            }
            Err(err) => {
                warn!(error = %err, job_id = %job.id, "job owner lookup failed; skipping application notification");
                return;
            }
        };

        let now = Utc::now();
        self.store(Notification::new(
            employer.id,
            "New Application",
            format!("{candidate_name} applied to {}", job.title),
            now,
        ))
        .await;

        self.email(EmailMessage {
            to: employer.email.clone(),
            subject: format!("New Application for {}", job.title),
            text: format!(
                "Hi {},\n\n{candidate_name} has applied to your job posting \"{}\".",
                employer.name, job.title
            ),
        })
        .await;

        self.publish(EventEnvelope::to_user(
            employer.id,
            now,
            DomainEvent::ApplicationSubmitted {
                application_id: application.id,
                job_id: job.id,
                job_title: job.title,
                candidate_id: application.candidate_id,
                candidate_name,
            },
        ));
    }

    /// Tell the candidate their application moved.
    pub async fn status_changed(&self, application: Application, job_title: String) {
        let now = Utc::now();
        let status = application.status.to_string();
        self.store(Notification::new(
            application.candidate_id,
            "Application Status Update",
            format!("Your application for {job_title} is now {status}"),
            now,
        ))
        .await;

        self.publish(EventEnvelope::to_user(
            application.candidate_id,
            now,
            DomainEvent::ApplicationStatusChanged {
                application_id: application.id,
                job_id: application.job_id,
                job_title,
                status,
            },
        ));
    }

    pub async fn welcome(&self, user: User) {
        self.email(EmailMessage {
            to: user.email,
            subject: "Welcome to the job board".to_string(),
            text: format!("Hi {}, your {} account is ready.", user.name, user.role),
        })
        .await;
    }

    pub fn job_posted(&self, job: &Job) {
        self.publish(EventEnvelope::broadcast(
            Utc::now(),
            DomainEvent::JobPosted {
                job_id: job.id,
                title: job.title.clone(),
                company: job.company.clone(),
                location: job.location.clone(),
                posted_by: job.posted_by,
            },
        ));
    }

    pub fn job_promoted(&self, job_id: JobId, owner: UserId, expires_at: DateTime<Utc>) {
        self.publish(EventEnvelope::to_user(
            owner,
            Utc::now(),
            DomainEvent::JobPromoted { job_id, expires_at },
        ));
    }

    async fn store(&self, notification: Notification) {
        let user_id = notification.user_id;
        if let Err(err) = self.notifications.insert(notification).await {
            warn!(error = %err, %user_id, "failed to store notification");
        }
    }

    async fn email(&self, message: EmailMessage) {
        let to = message.to.clone();
        let result = match tokio::time::timeout(self.email_timeout, self.mailer.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(MailError::Timeout),
        };
        if let Err(err) = result {
            warn!(error = %err, %to, "email send failed");
        }
    }

    fn publish(&self, envelope: EventEnvelope) {
        let event_type = envelope.payload().event_type();
        let delivered = self.bus.publish(envelope);
        debug!(event_type, delivered, "realtime event published");
    }
}
