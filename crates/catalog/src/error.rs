//! Catalog error types.

use thiserror::Error;

/// Reasons a submitted product or order is rejected before any store access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Product name is required.
    #[error("Product name is required")]
    NameRequired,

    /// Price must be a finite, non-negative number.
    #[error("Invalid price: {price} (must be a non-negative number)")]
    InvalidPrice { price: f64 },

    /// User ID is required.
    #[error("User ID is required")]
    UserIdRequired,

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// Line item quantity must be positive.
    #[error("Invalid quantity for {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: String, quantity: u32 },

    /// Order total must be a finite, non-negative number.
    #[error("Invalid total: {total} (must be a non-negative number)")]
    InvalidTotal { total: f64 },
}

/// Errors that can occur when reading or writing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted document failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store rejected or failed the operation.
    #[error("Catalog backend error: {0}")]
    Backend(String),

    /// A stored document could not be mapped to a catalog type.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A MongoDB driver error occurred.
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
