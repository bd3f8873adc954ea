//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;

/// Body returned for server-side failures; details only go to the log.
pub const INTERNAL_ERROR: &str = "internal_error";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Server-side failure; the message is what the client sees.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "Product not found".into()),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::Catalog(_) | DomainError::Cache(_) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
