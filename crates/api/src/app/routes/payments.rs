use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use jobboard_infra::services::VerifyRequest;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn protected_router() -> Router {
    Router::new()
        .route("/payments/create-order", post(create_order))
        .route("/payments/history", get(history))
}

/// Reachable without a token; a caller is attached when one is sent.
pub fn optional_auth_router() -> Router {
    Router::new().route("/payments/verify", post(verify))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .payments()
        .create_order(
            principal.principal(),
            body.amount.as_ref(),
            body.currency.as_deref(),
            body.job_id.as_deref(),
        )
        .await
    {
        Ok(created) => dto::success(StatusCode::CREATED, created),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<dto::VerifyPaymentRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let request = VerifyRequest {
        order_id: body.razorpay_order_id.as_deref(),
        payment_id: body.razorpay_payment_id.as_deref(),
        signature: body.razorpay_signature.as_deref(),
        transaction_id: body.transaction_id.as_deref(),
    };
    let caller = principal.as_ref().map(|Extension(ctx)| ctx.principal());

    match services.payments().verify(caller, request).await {
        Ok(verified) => {
            let message = if verified.already_paid {
                "payment already verified"
            } else {
                "payment verified; job promoted to premium"
            };
            dto::success_with_message(StatusCode::OK, message, verified)
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.payments().history(principal.principal()).await {
        Ok(items) => dto::success(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}
