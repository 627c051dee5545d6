//! Bearer-token authentication.
//!
//! `auth_middleware` rejects the request when the token is missing or bad,
//! reporting which check failed. `optional_auth_middleware` attaches the
//! caller when a valid token is present and otherwise lets the request
//! through anonymously.

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use jobboard_auth::AuthenticationError;
use jobboard_infra::services::AuthService;

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub auth: AuthService,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(err) => return errors::service_error_to_response(err.into()),
    };

    match state.auth.authenticate(token).await {
        Ok((principal, user)) => {
            req.extensions_mut().insert(PrincipalContext::new(principal, user.name));
            next.run(req).await
        }
        Err(err) => errors::service_error_to_response(err),
    }
}

pub async fn optional_auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Ok(token) = extract_bearer(req.headers()) {
        match state.auth.authenticate(token).await {
            Ok((principal, user)) => {
                req.extensions_mut().insert(PrincipalContext::new(principal, user.name));
            }
            Err(err) => debug!(error = %err, "ignoring unusable bearer token on optional-auth route"),
        }
    }
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthenticationError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthenticationError::Missing)?;

    let header = header.to_str().map_err(|_| AuthenticationError::Malformed)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(AuthenticationError::Malformed)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthenticationError::Missing);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn bearer_extraction_distinguishes_missing_from_malformed() {
        assert_eq!(extract_bearer(&headers(None)), Err(AuthenticationError::Missing));
        assert_eq!(extract_bearer(&headers(Some("Bearer  "))), Err(AuthenticationError::Missing));
        assert_eq!(extract_bearer(&headers(Some("Basic abc"))), Err(AuthenticationError::Malformed));
        assert_eq!(extract_bearer(&headers(Some("Bearer abc.def"))), Ok("abc.def"));
    }
}
