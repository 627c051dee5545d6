use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobboard_core::UserId;

use crate::Role;

/// Bearer-token claims.
///
/// Timestamps are unix seconds so that the encoded token stays interoperable
/// with standard JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user id.
    pub sub: UserId,

    /// Role at issue time. The stored user remains the source of truth.
    pub role: Role,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiration (unix seconds).
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: UserId, role: Role, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub,
            role,
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature verification happens in [`crate::jwt`]; this only checks the time
/// window.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Why a request could not be tied to a user. Each variant is reported
/// distinctly to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("authentication token missing")]
    Missing,

    #[error("authentication token malformed")]
    Malformed,

    #[error("authentication token expired")]
    Expired,

    #[error("authentication token signature is invalid")]
    InvalidSignature,

    #[error("user for this token no longer exists")]
    UnknownIdentity,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("authentication internal error: {0}")]
    Internal(String),
}

impl From<TokenValidationError> for AuthenticationError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => AuthenticationError::Expired,
            TokenValidationError::InvalidTimeWindow => AuthenticationError::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expires_at_the_boundary() {
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), Role::Employer, now, 60);
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut claims = JwtClaims::new(UserId::new(), Role::Candidate, now, 60);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
