use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{ApplicationId, JobId, UserId};

/// Facts emitted after a successful write. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DomainEvent {
    JobPosted {
        job_id: JobId,
        title: String,
        company: String,
        location: String,
        posted_by: UserId,
    },
    ApplicationSubmitted {
        application_id: ApplicationId,
        job_id: JobId,
        job_title: String,
        candidate_id: UserId,
        candidate_name: String,
    },
    ApplicationStatusChanged {
        application_id: ApplicationId,
        job_id: JobId,
        job_title: String,
        status: String,
    },
    JobPromoted {
        job_id: JobId,
        expires_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Stable event name (also used as the SSE event name).
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::JobPosted { .. } => "job.posted",
            DomainEvent::ApplicationSubmitted { .. } => "application.submitted",
            DomainEvent::ApplicationStatusChanged { .. } => "application.status_changed",
            DomainEvent::JobPromoted { .. } => "job.promoted",
        }
    }
}
