//! Prometheus scrape endpoint.
//!
//! This endpoint is unauthenticated so Prometheus can scrape it. Series carry
//! node identity and load counts only.

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;

/// Create a router serving `GET /metrics` from `handle`.
///
/// Obtain the handle from [`RoomTelemetry::prometheus_handle`](crate::RoomTelemetry::prometheus_handle).
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(handle)
}

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "room_telemetry.metrics.scrape")]
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
