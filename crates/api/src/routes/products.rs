//! Product creation, listing and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use catalog::{NewProduct, Product, ProductSummary};
use common::ProductId;
use domain::{DomainError, Viewer};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub message: &'static str,
    pub product_id: String,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub count: usize,
    pub products: Vec<ProductSummary>,
}

#[derive(Serialize)]
pub struct ViewCountResponse {
    pub product_id: String,
    pub views: i64,
}

// -- Handlers --

/// POST /products: create a product in the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    match state.products.create_product(req).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(ProductCreatedResponse {
                message: "product_created",
                product_id: id.into_string(),
            }),
        )),
        Err(err @ DomainError::Validation(_)) => Err(err.into()),
        Err(err) => {
            tracing::error!(error = %err, "product creation failed");
            Err(ApiError::Internal("failed_product_creation".to_string()))
        }
    }
}

/// GET /products: list every product's summary.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.products.list_products().await?;

    Ok(Json(ProductListResponse {
        count: products.len(),
        products,
    }))
}

/// GET /products/{id}: cache-aside lookup that records the view.
#[tracing::instrument(skip(state, params))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ViewerParams>,
) -> Result<Json<Product>, ApiError> {
    let viewer = Viewer::new(params.user_id, params.session_id);
    let product = state
        .products
        .get_product(&ProductId::new(id), &viewer)
        .await?;

    Ok(Json(product))
}

/// GET /products/{id}/views: current view counter.
#[tracing::instrument(skip(state))]
pub async fn views(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewCountResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let views = state.products.view_count(&product_id).await?;

    Ok(Json(ViewCountResponse {
        product_id: product_id.into_string(),
        views,
    }))
}
