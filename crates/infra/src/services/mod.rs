//! Workflow services: the operations the HTTP layer exposes, expressed over
//! the store traits, the payment provider and the notifier.

mod analytics;
mod applications;
mod auth;
mod error;
mod jobs;
mod notifications;
mod payments;

use std::sync::Arc;
use std::time::Duration;

use jobboard_auth::{DEFAULT_TOKEN_TTL_SECS, Hs256TokenCodec};
use jobboard_events::{BroadcastEventBus, EventBus, EventEnvelope};
use jobboard_payments::PaymentProvider;

pub use analytics::{AnalyticsService, EmployerAnalytics, JobApplicants};
pub use applications::{
    ApplicationService, CandidateApplicationView, CandidateSummary, EmployerApplicationView,
    JobRef, JobSummary,
};
pub use auth::{AuthService, AuthSession};
pub use error::{ServiceError, ServiceResult};
pub use jobs::{JobService, JobView, PosterSummary};
pub use notifications::NotificationService;
pub use payments::{
    CreatedOrder, DEFAULT_PAYMENT_TIMEOUT, PaymentService, TransactionView, VerifiedPayment,
    VerifyRequest,
};

use crate::mailer::Mailer;
use crate::notifier::{DEFAULT_EMAIL_TIMEOUT, Notifier};
use crate::reconcile::PromotionReconciler;
use crate::store::Stores;

/// Secrets and timeouts the services need.
#[derive(Clone)]
pub struct ServiceSettings {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub payment_key_secret: String,
    pub payment_timeout: Duration,
    pub email_timeout: Duration,
}

impl ServiceSettings {
    pub fn new(jwt_secret: impl Into<String>, payment_key_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            payment_key_secret: payment_key_secret.into(),
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
            email_timeout: DEFAULT_EMAIL_TIMEOUT,
        }
    }
}

impl core::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("payment_timeout", &self.payment_timeout)
            .field("email_timeout", &self.email_timeout)
            .finish_non_exhaustive()
    }
}

/// Every service wired against one set of stores and one event bus.
#[derive(Clone)]
pub struct ServiceSet {
    pub auth: AuthService,
    pub jobs: JobService,
    pub applications: ApplicationService,
    pub payments: PaymentService,
    pub analytics: AnalyticsService,
    pub notifications: NotificationService,
    pub reconciler: PromotionReconciler,
    pub bus: Arc<dyn EventBus<EventEnvelope>>,
}

impl ServiceSet {
    pub fn new(
        stores: Stores,
        provider: Arc<dyn PaymentProvider>,
        mailer: Arc<dyn Mailer>,
        settings: ServiceSettings,
    ) -> Self {
        let bus: Arc<dyn EventBus<EventEnvelope>> = Arc::new(BroadcastEventBus::<EventEnvelope>::default());
        let notifier = Notifier::new(
            stores.users.clone(),
            stores.notifications.clone(),
            mailer,
            bus.clone(),
            settings.email_timeout,
        );
        let tokens = Hs256TokenCodec::new(settings.jwt_secret.as_bytes(), settings.token_ttl_secs);

        Self {
            auth: AuthService::new(stores.users.clone(), tokens, notifier.clone()),
            jobs: JobService::new(
                stores.jobs.clone(),
                stores.users.clone(),
                stores.cascade.clone(),
                notifier.clone(),
            ),
            applications: ApplicationService::new(
                stores.applications.clone(),
                stores.jobs.clone(),
                stores.users.clone(),
                notifier.clone(),
            ),
            payments: PaymentService::new(
                stores.transactions.clone(),
                stores.jobs.clone(),
                provider,
                &settings.payment_key_secret,
                settings.payment_timeout,
                notifier.clone(),
            ),
            analytics: AnalyticsService::new(stores.jobs.clone(), stores.applications.clone()),
            notifications: NotificationService::new(stores.notifications.clone()),
            reconciler: PromotionReconciler::new(stores.transactions.clone(), stores.jobs.clone(), notifier),
            bus,
        }
    }
}
