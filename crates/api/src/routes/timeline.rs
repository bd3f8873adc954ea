//! Product event timeline endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use common::ProductId;
use event_store::Event;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TimelineParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    pub product_id: String,
    pub count: usize,
    pub events: Vec<Event>,
}

/// GET /products/{id}/timeline: newest-first events within a date window.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let start = parse_date("start_date", params.start_date.as_deref())?;
    let end = parse_date("end_date", params.end_date.as_deref())?;
    let limit = parse_limit(params.limit.as_deref())?;

    let window = state.timeline.window(start, end, limit);
    let max_days = state.timeline.config().max_days;
    if window.days() > u64::from(max_days) {
        return Err(ApiError::BadRequest(format!(
            "Invalid date range: at most {max_days} days"
        )));
    }

    let product_id = ProductId::new(id);
    let events = state.timeline.query(&product_id, &window).await;

    Ok(Json(TimelineResponse {
        product_id: product_id.into_string(),
        count: events.len(),
        events,
    }))
}

/// Parses an optional ISO `YYYY-MM-DD` date. Blank counts as absent.
fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {field}: expected YYYY-MM-DD"))),
    }
}

/// Parses an optional integer limit; values below 1 become 1.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => {
            let value: i64 = s
                .parse()
                .map_err(|_| ApiError::BadRequest("Invalid limit: expected an integer".into()))?;
            Ok(Some(usize::try_from(value.max(1)).unwrap_or(usize::MAX)))
        }
    }
}
