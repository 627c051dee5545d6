use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobboard_core::{ApplicationId, DomainError, Entity, JobId, UserId};

use crate::ApplicationStatus;

/// One candidate's application to one job. At most one exists per
/// `(job_id, candidate_id)` pair; the store enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: UserId,
    pub resume_link: Option<String>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Application {
    type Id = ApplicationId;

    fn id(&self) -> ApplicationId {
        self.id
    }
}

/// Candidate-supplied fields when applying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub resume_link: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("application is already withdrawn")]
    AlreadyWithdrawn,

    #[error("cannot withdraw application with status: {0}")]
    Finalized(ApplicationStatus),

    #[error("application is {0}; no further status changes are allowed")]
    Terminal(ApplicationStatus),

    #[error("cannot move application back from {from} to {to}")]
    Backward {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("{0} cannot be set by an employer")]
    NotAnEmployerTarget(ApplicationStatus),
}

impl From<TransitionError> for DomainError {
    fn from(value: TransitionError) -> Self {
        DomainError::invalid_transition(value.to_string())
    }
}

impl Application {
    pub fn submit(
        id: ApplicationId,
        job_id: JobId,
        candidate_id: UserId,
        draft: ApplicationDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id,
            candidate_id,
            resume_link: draft.resume_link,
            cover_letter: draft.cover_letter,
            status: ApplicationStatus::Applied,
            applied_at: now,
            updated_at: None,
        }
    }

    /// Employer-driven forward transition.
    ///
    /// Terminal states never move. Backward moves are refused. Re-setting the
    /// current status is accepted and only bumps `updated_at`.
    pub fn advance(&mut self, target: ApplicationStatus, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        if !target.is_employer_target() {
            return Err(TransitionError::NotAnEmployerTarget(target));
        }
        if target.rank() < self.status.rank() {
            return Err(TransitionError::Backward {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Candidate-driven withdrawal from any non-terminal state.
    pub fn withdraw(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        match self.status {
            ApplicationStatus::Withdrawn => Err(TransitionError::AlreadyWithdrawn),
            ApplicationStatus::Hired | ApplicationStatus::Rejected => {
                Err(TransitionError::Finalized(self.status))
            }
            _ => {
                self.status = ApplicationStatus::Withdrawn;
                self.updated_at = Some(now);
                Ok(())
            }
        }
    }
}
