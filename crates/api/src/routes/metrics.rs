//! Prometheus scrape endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use domain::EventRecorder;
use metrics_exporter_prometheus::PrometheusHandle;

/// State for the scrape route: the exporter plus what it samples on demand.
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
    pub recorder: EventRecorder,
}

/// GET /metrics: Prometheus text exposition.
pub async fn get(State(scrape): State<MetricsState>) -> impl IntoResponse {
    metrics::gauge!("event_log_pending_writes").set(scrape.recorder.pending() as f64);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        scrape.handle.render(),
    )
}
