//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: wiring of stores, provider, mailer and services
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and the response envelope
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use jobboard_infra::ServiceSet;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: ServiceSet) -> Router {
    let auth_state = middleware::AuthState {
        auth: services.auth.clone(),
    };
    let services = Arc::new(services::AppServices::new(services));

    // Protected routes: require a valid bearer token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::auth_middleware,
    ));

    let optional = routes::optional_auth_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::optional_auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .merge(optional)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
