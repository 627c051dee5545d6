use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, put},
};

use jobboard_core::NotificationId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn protected_router() -> Router {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", put(mark_read))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.notifications().list(principal.principal()).await {
        Ok(items) => dto::success(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match NotificationId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.notifications().mark_read(principal.principal(), id).await {
        Ok(notification) => dto::success(StatusCode::OK, notification),
        Err(e) => errors::service_error_to_response(e),
    }
}
