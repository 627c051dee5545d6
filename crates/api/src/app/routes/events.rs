//! Realtime delivery over Server-Sent Events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    response::sse::{Event as SseEvent, Sse},
    routing::get,
};
use tokio_stream::Stream;
use tracing::debug;

use crate::app::services::{self, AppServices};
use crate::context::PrincipalContext;

pub fn protected_router() -> Router {
    Router::new().route("/events/stream", get(stream))
}

/// GET /events/stream
///
/// Envelopes addressed to the caller plus broadcasts, until the client
/// disconnects.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    debug!(user_id = %principal.user_id(), "realtime subscriber connected");
    services::recipient_sse_stream(&services, principal.user_id())
}
