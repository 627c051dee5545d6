//! Service wiring for the HTTP layer.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use jobboard_core::UserId;
use jobboard_infra::services::{
    AnalyticsService, ApplicationService, AuthService, JobService, NotificationService,
    PaymentService,
};
use jobboard_infra::{LogMailer, RazorpayClient, ServiceSet, Stores};

use crate::config::AppConfig;

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppServices {
    inner: ServiceSet,
}

impl AppServices {
    pub fn new(inner: ServiceSet) -> Self {
        Self { inner }
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn jobs(&self) -> &JobService {
        &self.inner.jobs
    }

    pub fn applications(&self) -> &ApplicationService {
        &self.inner.applications
    }

    pub fn payments(&self) -> &PaymentService {
        &self.inner.payments
    }

    pub fn analytics(&self) -> &AnalyticsService {
        &self.inner.analytics
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.inner.notifications
    }

    pub fn service_set(&self) -> &ServiceSet {
        &self.inner
    }
}

/// Build the production service set from configuration.
///
/// Uses Postgres when compiled with the `postgres` feature and `DATABASE_URL`
/// is set; in-memory stores otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<ServiceSet> {
    let stores = build_stores(config).await?;
    let provider = RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        config.razorpay_base_url.clone(),
        config.payment_timeout,
    )
    .context("failed to build payment provider client")?;

    Ok(ServiceSet::new(
        stores,
        Arc::new(provider),
        Arc::new(LogMailer),
        config.service_settings(),
    ))
}

#[cfg(feature = "postgres")]
async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let Some(url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set; using in-memory stores");
        return Ok(Stores::in_memory());
    };
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    jobboard_infra::store::PgStore::new(pool.clone())
        .migrate()
        .await
        .context("failed to apply database schema")?;
    info!("using postgres stores");
    Ok(Stores::postgres(pool))
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but this build has no postgres support; using in-memory stores");
    } else {
        info!("using in-memory stores");
    }
    Ok(Stores::in_memory())
}

/// SSE stream of the events addressed to `user`, plus broadcasts.
///
/// Lagging clients skip what they missed; the stored notifications are the
/// durable record.
pub fn recipient_sse_stream(
    services: &AppServices,
    user: UserId,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>> + use<>> {
    let stream = services
        .inner
        .bus
        .subscribe()
        .into_recipient_stream(user)
        .filter_map(|envelope| match serde_json::to_string(&envelope) {
            Ok(data) => Some(Ok(SseEvent::default()
                .event(envelope.payload().event_type())
                .id(envelope.event_id().to_string())
                .data(data))),
            Err(err) => {
                warn!(error = %err, "failed to encode realtime event");
                None
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE))
}
