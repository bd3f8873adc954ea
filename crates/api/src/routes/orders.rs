//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use catalog::NewOrder;
use domain::DomainError;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub message: &'static str,
    pub order_id: String,
}

/// POST /orders: persist an order and emit its purchase events.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewOrder>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    match state.orders.place_order(req).await {
        Ok(order_id) => Ok((
            StatusCode::CREATED,
            Json(OrderCreatedResponse {
                message: "order_created",
                order_id: order_id.to_string(),
            }),
        )),
        Err(err @ DomainError::Validation(_)) => Err(err.into()),
        Err(err) => {
            tracing::error!(error = %err, "order placement failed");
            Err(ApiError::Internal("failed_order_creation".to_string()))
        }
    }
}
