use std::sync::Arc;

use axum::{Router, extract::Extension, http::StatusCode, routing::get};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn protected_router() -> Router {
    Router::new().route("/analytics/employer", get(employer_summary))
}

pub async fn employer_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.analytics().employer_summary(principal.principal()).await {
        Ok(summary) => dto::success(StatusCode::OK, summary),
        Err(e) => errors::service_error_to_response(e),
    }
}
