use axum::{Router, routing::get};

pub mod analytics;
pub mod applications;
pub mod auth;
pub mod events;
pub mod jobs;
pub mod notifications;
pub mod payments;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(auth::router())
        .merge(jobs::router())
}

/// Endpoints that require a valid bearer token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(system::whoami))
        .merge(jobs::protected_router())
        .merge(applications::protected_router())
        .merge(payments::protected_router())
        .merge(analytics::protected_router())
        .merge(notifications::protected_router())
        .merge(events::protected_router())
}

/// Endpoints where a token is optional.
pub fn optional_auth_router() -> Router {
    payments::optional_auth_router()
}
