use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};

use jobboard_core::{JobId, PageRequest};
use jobboard_jobs::{JobDraft, JobFilter, JobPatch};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// Unauthenticated reads.
pub fn router() -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
}

/// Employer writes; mounted behind the auth middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/:id", axum::routing::put(update_job).delete(delete_job))
}

pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::JobListQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let filter = JobFilter::from_query(
        query.q.as_deref(),
        query.location.as_deref(),
        query.category.as_deref(),
        query.experience_level.as_deref(),
        query.is_premium.as_deref(),
    );
    let page = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());

    match services.jobs().list(&filter, page).await {
        Ok(page) => dto::success(StatusCode::OK, page),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match JobId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };
    match services.jobs().get(id).await {
        Ok(job) => dto::success(StatusCode::OK, job),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<JobDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    match services.jobs().create(principal.principal(), draft).await {
        Ok(job) => dto::success_with_message(StatusCode::CREATED, "job posted successfully", job),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<JobPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match JobId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    match services.jobs().update(principal.principal(), id, patch).await {
        Ok(job) => dto::success_with_message(StatusCode::OK, "job updated successfully", job),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match JobId::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };
    match services.jobs().delete(principal.principal(), id).await {
        Ok(outcome) => dto::success_with_message(
            StatusCode::OK,
            "job and related applications deleted",
            serde_json::json!({ "applicationsRemoved": outcome.applications_removed }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
