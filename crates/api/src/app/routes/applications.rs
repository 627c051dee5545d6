use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};

use jobboard_applications::ApplicationDraft;
use jobboard_core::{ApplicationId, JobId};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn protected_router() -> Router {
    Router::new()
        .route("/applications/apply/:job_id", post(apply))
        .route("/applications/me", get(my_applications))
        .route("/applications/employer", get(employer_applications))
        .route("/applications/:id/status", put(update_status))
        .route("/applications/:id/withdraw", put(withdraw))
}

pub async fn apply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(job_id): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let job_id = match JobId::parse_str(&job_id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };
    let draft: ApplicationDraft = match dto::optional_json(&body) {
        Ok(draft) => draft,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    };

    match services
        .applications()
        .apply(principal.principal(), job_id, draft)
        .await
    {
        Ok(application) => {
            dto::success_with_message(StatusCode::CREATED, "application submitted successfully", application)
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn my_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.applications().list_mine(principal.principal()).await {
        Ok(items) => dto::success(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn employer_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::EmployerApplicationsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let job_id = match query
        .job_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(JobId::parse_str)
        .transpose()
    {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services
        .applications()
        .list_for_employer(principal.principal(), job_id)
        .await
    {
        Ok(items) => dto::success(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::StatusUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match ApplicationId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .applications()
        .update_status(principal.principal(), id, body.status.as_deref())
        .await
    {
        Ok(application) => dto::success_with_message(
            StatusCode::OK,
            &format!("application status updated to {}", application.status.as_str()),
            application,
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match ApplicationId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.applications().withdraw(principal.principal(), id).await {
        Ok(application) => {
            dto::success_with_message(StatusCode::OK, "application withdrawn successfully", application)
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
