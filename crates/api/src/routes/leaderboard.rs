//! Most viewed products.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domain::RankedProduct;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Entries returned when `n` is not given.
const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub n: Option<String>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub count: usize,
    pub products: Vec<RankedProduct>,
}

/// GET /leaderboard?n=: top products by view score.
#[tracing::instrument(skip(state))]
pub async fn top(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let n = match params.n.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_TOP_N,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::BadRequest("Invalid n: expected a non-negative integer".into())
        })?,
    };

    let products = state.products.top_products(n).await?;

    Ok(Json(LeaderboardResponse {
        count: products.len(),
        products,
    }))
}
