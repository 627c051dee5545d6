//! Request DTOs and the success envelope.
//!
//! Every request field is optional at the wire level so that a missing field
//! is reported by the domain validation with a specific message, not by a
//! generic deserialization failure. Unknown fields are ignored.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    pub is_premium: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerApplicationsQuery {
    pub job_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Number or numeric string.
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub job_id: Option<String>,
}

/// Field names follow the provider's checkout callback.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
}

/// Parse a JSON body that may be left out entirely.
///
/// Only an empty (or all-whitespace) body means "no body"; anything else must
/// be valid JSON for `T`.
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

// -------------------------
// Responses
// -------------------------

/// `{"success": true, "data": ...}` with the given status.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (status, axum::Json(json!({ "success": true, "data": data }))).into_response()
}

/// Success with a human-readable message alongside the data.
pub fn success_with_message<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({ "success": true, "message": message, "data": data })),
    )
        .into_response()
}
