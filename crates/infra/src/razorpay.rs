//! Reqwest-backed payment provider adapter (Razorpay orders API).
//!
//! Owns transport details only: basic auth, the request timeout, HTTP error
//! mapping and decoding the order response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use jobboard_payments::{OrderRequest, PROVIDER_NAME, PaymentProvider, ProviderError, ProviderOrder};

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/v1";

pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }
}

#[async_trait]
impl PaymentProvider for RazorpayClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, ProviderError> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let order = parse_order(body.as_ref())?;
        debug!(order_id = %order.id, amount = order.amount, "provider order created");
        Ok(order)
    }
}

fn parse_order(body: &[u8]) -> Result<ProviderOrder, ProviderError> {
    let raw: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid order JSON: {e}")))?;
    let mut order: ProviderOrder = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::InvalidResponse(format!("order is missing fields: {e}")))?;
    order.raw = raw;
    Ok(order)
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        return ProviderError::Timeout;
    }
    ProviderError::Transport(err.to_string())
}

/// Provider error bodies look like `{"error": {"description": "..."}}`.
fn map_status_error(status: StatusCode, body: &[u8]) -> ProviderError {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .and_then(|d| d.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    warn!(status = status.as_u16(), %message, "payment provider rejected order");
    ProviderError::Rejected {
        status: status.as_u16(),
        message,
    }
}
