//! Service-level error taxonomy.

use thiserror::Error;

use jobboard_applications::TransitionError;
use jobboard_auth::{AuthenticationError, AuthzError, PasswordError};
use jobboard_core::DomainError;
use jobboard_payments::{ProviderError, SignatureError};

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing, invalid or expired credential.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// Valid identity, wrong role or not the owner.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Validation, not found, conflict or a refused transition.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The payment provider failed; the whole operation failed with it.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Dangling reference or a state that should be impossible.
    #[error("integrity failure: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller should only ever see a generic message.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            ServiceError::Integrity(_)
                | ServiceError::Store(_)
                | ServiceError::Internal(_)
                | ServiceError::Signature(SignatureError::MissingSecret)
                | ServiceError::Authentication(AuthenticationError::Internal(_))
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => ServiceError::Domain(DomainError::not_found(what)),
            StoreError::Duplicate(msg) => ServiceError::Domain(DomainError::conflict(msg)),
            StoreError::Stale(msg) => ServiceError::Domain(DomainError::conflict(msg)),
            backend @ StoreError::Backend(_) => ServiceError::Store(backend),
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(value: TransitionError) -> Self {
        ServiceError::Domain(value.into())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(value: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("background task failed: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_fold_into_the_domain_taxonomy() {
        assert_eq!(
            ServiceError::from(StoreError::NotFound("job")),
            ServiceError::Domain(DomainError::not_found("job"))
        );
        assert!(matches!(
            ServiceError::from(StoreError::Duplicate("pair".into())),
            ServiceError::Domain(DomainError::Conflict(_))
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Stale("status moved".into())),
            ServiceError::Domain(DomainError::Conflict(_))
        ));
        assert!(ServiceError::from(StoreError::Backend("down".into())).is_server_fault());
    }
}
