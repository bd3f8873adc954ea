//! Liveness endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Event-log writes submitted but not yet reaped.
    pub pending_event_writes: usize,
}

/// GET /health: process is up and serving.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        pending_event_writes: state.recorder.pending(),
    })
}
