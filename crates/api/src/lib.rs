//! HTTP API server for the product analytics read path.
//!
//! Serves product lookups, event timelines, the view leaderboard and order
//! placement, with structured logging (tracing) and Prometheus metrics.

pub mod backends;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::{AppState, Stores};

use routes::metrics::MetricsState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(MetricsState {
            handle: metrics_handle,
            recorder: state.recorder.clone(),
        });

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            post(routes::products::create).get(routes::products::list),
        )
        .route("/products/{id}", get(routes::products::get))
        .route("/products/{id}/views", get(routes::products::views))
        .route("/products/{id}/timeline", get(routes::timeline::get))
        .route("/leaderboard", get(routes::leaderboard::top))
        .route("/orders", post(routes::orders::create))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over in-memory stores.
pub fn create_in_memory_state(config: &Config) -> Arc<AppState> {
    Arc::new(AppState::new(Stores::in_memory(), config))
}
