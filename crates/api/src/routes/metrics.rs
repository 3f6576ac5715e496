//! Prometheus exposition endpoint.
//!
//! Renders the engine's counter families (`sales_*`, `publish_*`,
//! `stock_cache_rebuilds_total`, `tablestore_retries_total`) and the
//! `publish_cycle_duration_seconds` histogram.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics — current metric snapshot in Prometheus text format.
pub async fn render(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
