use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .auth()
        .register(
            body.name.as_deref(),
            body.email.as_deref(),
            body.password.as_deref(),
            body.role.as_deref(),
        )
        .await
    {
        Ok(session) => dto::success_with_message(StatusCode::CREATED, "user registered successfully", session),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .auth()
        .login(body.email.as_deref(), body.password.as_deref())
        .await
    {
        Ok(session) => dto::success_with_message(StatusCode::OK, "login successful", session),
        Err(e) => errors::service_error_to_response(e),
    }
}
