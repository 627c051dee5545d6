use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn whoami(
    axum::extract::Extension(principal): axum::extract::Extension<crate::context::PrincipalContext>,
) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "id": principal.user_id().to_string(),
            "name": principal.name(),
            "role": principal.role().as_str(),
        }
    }))
}
