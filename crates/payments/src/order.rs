//! Provider order contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobboard_core::UserId;

use crate::{Amount, Currency};

/// Body sent to the provider's order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub payment_capture: u8,
}

impl OrderRequest {
    pub fn new(amount: Amount, currency: &Currency, receipt: String) -> Self {
        Self {
            amount: amount.minor(),
            currency: currency.as_str().to_string(),
            receipt,
            payment_capture: 1,
        }
    }
}

/// Receipt id derived from the employer and the current time.
///
/// `rcpt_<first 16 hex of employer id>_<unix millis>`, which stays within the
/// provider's 40 character limit.
pub fn receipt_for(employer: UserId, now: DateTime<Utc>) -> String {
    let hex = employer.as_uuid().simple().to_string();
    format!("rcpt_{}_{}", &hex[..16], now.timestamp_millis())
}

/// The provider's view of a created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Full provider response, kept as opaque metadata.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("payment provider timed out")]
    Timeout,

    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("payment provider unreachable: {0}")]
    Transport(String),

    #[error("unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// A single payment provider. Implementations must bound every call with a
/// timeout and report it as [`ProviderError::Timeout`].
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Stable provider name stored on transactions.
    fn name(&self) -> &'static str;

    /// Public key identifier handed to clients. Never the secret.
    fn key_id(&self) -> &str;

    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_fits_provider_limit() {
        let receipt = receipt_for(UserId::new(), Utc::now());
        assert!(receipt.starts_with("rcpt_"));
        assert!(receipt.len() <= 40, "{receipt}");
    }

    #[test]
    fn order_request_always_captures() {
        let amount = Amount::from_minor(10_000).unwrap();
        let req = OrderRequest::new(amount, &Currency::default(), "rcpt_x".into());
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["amount"], 10_000);
        assert_eq!(body["currency"], "INR");
        assert_eq!(body["payment_capture"], 1);
    }
}
