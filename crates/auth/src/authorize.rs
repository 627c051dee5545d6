//! The single authorization policy.
//!
//! Every handler describes what it wants to do as an [`Action`] and calls
//! [`authorize`]. Ownership fields inside an action must come from the stored
//! entity, loaded before the check, never from client input.

use thiserror::Error;

use jobboard_core::UserId;

use crate::{Principal, Role};

/// An operation together with the ownership facts it is checked against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    CreateJob,
    /// Update or delete a job; `owner` is the job's stored `postedBy`.
    MutateJob { owner: UserId },
    Apply,
    ListOwnApplications,
    /// List applications to the employer's jobs, optionally narrowed to one job.
    ListEmployerApplications { job_owner: Option<UserId> },
    /// Forward status change; `job_owner` is the `postedBy` of the job the
    /// application points to.
    AdvanceApplication { job_owner: UserId },
    /// Withdrawal; `candidate` is the application's stored candidate.
    WithdrawApplication { candidate: UserId },
    CreatePaymentOrder,
    ViewTransactionHistory,
    ViewAnalytics,
    ReadNotification { recipient: UserId },
}

impl Action {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateJob => "job.create",
            Action::MutateJob { .. } => "job.mutate",
            Action::Apply => "application.apply",
            Action::ListOwnApplications => "application.list_own",
            Action::ListEmployerApplications { .. } => "application.list_employer",
            Action::AdvanceApplication { .. } => "application.advance",
            Action::WithdrawApplication { .. } => "application.withdraw",
            Action::CreatePaymentOrder => "payment.create_order",
            Action::ViewTransactionHistory => "payment.history",
            Action::ViewAnalytics => "analytics.employer",
            Action::ReadNotification { .. } => "notification.read",
        }
    }

    fn required_role(&self) -> Option<Role> {
        match self {
            Action::CreateJob
            | Action::MutateJob { .. }
            | Action::ListEmployerApplications { .. }
            | Action::AdvanceApplication { .. }
            | Action::CreatePaymentOrder
            | Action::ViewTransactionHistory
            | Action::ViewAnalytics => Some(Role::Employer),
            Action::Apply | Action::ListOwnApplications | Action::WithdrawApplication { .. } => {
                Some(Role::Candidate)
            }
            Action::ReadNotification { .. } => None,
        }
    }

    fn owner(&self) -> Option<UserId> {
        match self {
            Action::MutateJob { owner } => Some(*owner),
            Action::ListEmployerApplications { job_owner } => *job_owner,
            Action::AdvanceApplication { job_owner } => Some(*job_owner),
            Action::WithdrawApplication { candidate } => Some(*candidate),
            Action::ReadNotification { recipient } => Some(*recipient),
            _ => None,
        }
    }

    fn wrong_role_message(&self) -> &'static str {
        match self {
            Action::CreateJob => "only employers can post jobs",
            Action::MutateJob { .. } => "only employers can modify jobs",
            Action::Apply => "only candidates can apply to jobs",
            Action::ListOwnApplications => "only candidates have their own applications",
            Action::ListEmployerApplications { .. } => "only employers can review applications",
            Action::AdvanceApplication { .. } => "only employers can update application status",
            Action::WithdrawApplication { .. } => "only candidates can withdraw applications",
            Action::CreatePaymentOrder => "only employers can create payment orders",
            Action::ViewTransactionHistory => "only employers can view transaction history",
            Action::ViewAnalytics => "only employers can view analytics",
            Action::ReadNotification { .. } => "not allowed",
        }
    }

    fn not_owner_message(&self) -> &'static str {
        match self {
            Action::MutateJob { .. } => "you do not own this job",
            Action::ListEmployerApplications { .. } => "you do not own this job",
            Action::AdvanceApplication { .. } => {
                "you can only update applications to jobs you posted"
            }
            Action::WithdrawApplication { .. } => "you can only withdraw your own applications",
            Action::ReadNotification { .. } => "not authorized to modify this notification",
            _ => "not the owner of this resource",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {message}")]
    WrongRole {
        action: &'static str,
        required: Role,
        message: &'static str,
    },

    #[error("forbidden: {message}")]
    NotOwner {
        action: &'static str,
        message: &'static str,
    },
}

impl AuthzError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthzError::WrongRole { message, .. } | AuthzError::NotOwner { message, .. } => message,
        }
    }
}

/// Decide whether `principal` may perform `action`.
///
/// - No IO
/// - No panics
/// - Role is checked before ownership, so a candidate touching an employer
///   resource always gets the role message.
pub fn authorize(principal: &Principal, action: &Action) -> Result<(), AuthzError> {
    if let Some(required) = action.required_role() {
        if principal.role != required {
            return Err(AuthzError::WrongRole {
                action: action.name(),
                required,
                message: action.wrong_role_message(),
            });
        }
    }

    if let Some(owner) = action.owner() {
        if owner != principal.user_id {
            return Err(AuthzError::NotOwner {
                action: action.name(),
                message: action.not_owner_message(),
            });
        }
    }

    Ok(())
}
