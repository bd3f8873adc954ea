//! Domain error types.

use cache::CacheError;
use catalog::{CatalogError, ValidationError};
use common::ProductId;
use thiserror::Error;

/// Errors that can occur during domain operations.
///
/// Side-effect failures never show up here; they are logged and dropped.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The authoritative catalog has no such product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A submitted product or order was rejected.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// An error occurred in the catalog store.
    #[error("Catalog error: {0}")]
    Catalog(CatalogError),

    /// An error occurred reading counters or rankings.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<CatalogError> for DomainError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(v) => DomainError::Validation(v),
            other => DomainError::Catalog(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
