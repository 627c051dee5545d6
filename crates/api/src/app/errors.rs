use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, warn};

use jobboard_auth::AuthenticationError;
use jobboard_core::DomainError;
use jobboard_infra::ServiceError;
use jobboard_payments::{ProviderError, SignatureError};

const GENERIC_SERVER_MESSAGE: &str = "internal server error";

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let (status, code, message) = classify(&err);
    if status.is_server_error() {
        error!(error = %err, code, "request failed");
    } else if matches!(err, ServiceError::Signature(SignatureError::Mismatch)) {
        warn!(code, "payment signature mismatch");
    }
    json_error(status, code, message)
}

fn classify(err: &ServiceError) -> (StatusCode, &'static str, String) {
    match err {
        ServiceError::Authentication(auth) => {
            let code = match auth {
                AuthenticationError::Missing => "token_missing",
                AuthenticationError::Malformed => "token_malformed",
                AuthenticationError::Expired => "token_expired",
                AuthenticationError::InvalidSignature => "token_invalid_signature",
                AuthenticationError::UnknownIdentity => "user_not_found",
                AuthenticationError::InvalidCredentials => "invalid_credentials",
                AuthenticationError::Internal(_) => {
                    return server_fault("internal_error");
                }
            };
            (StatusCode::UNAUTHORIZED, code, auth.to_string())
        }
        ServiceError::Forbidden(authz) => (StatusCode::FORBIDDEN, "forbidden", authz.message().to_string()),
        ServiceError::Domain(domain) => match domain {
            DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            DomainError::InvalidId(msg) => (StatusCode::BAD_REQUEST, "invalid_id", msg.clone()),
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", domain.to_string()),
            DomainError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            DomainError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, "invalid_transition", msg.clone()),
            DomainError::InvariantViolation(_) => server_fault("integrity_error"),
        },
        ServiceError::Signature(SignatureError::Mismatch) => (
            StatusCode::BAD_REQUEST,
            "signature_mismatch",
            SignatureError::Mismatch.to_string(),
        ),
        ServiceError::Signature(SignatureError::MissingSecret) => server_fault("internal_error"),
        ServiceError::Provider(ProviderError::Timeout) => (
            StatusCode::GATEWAY_TIMEOUT,
            "provider_error",
            "payment provider timed out".to_string(),
        ),
        ServiceError::Provider(_) => (
            StatusCode::BAD_GATEWAY,
            "provider_error",
            "payment provider request failed".to_string(),
        ),
        ServiceError::Integrity(_) => server_fault("integrity_error"),
        ServiceError::Store(_) | ServiceError::Internal(_) => server_fault("internal_error"),
    }
}

fn server_fault(code: &'static str) -> (StatusCode, &'static str, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, code, GENERIC_SERVER_MESSAGE.to_string())
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
