use std::sync::Arc;

use async_trait::async_trait;

use crate::{NewOrder, NewProduct, OrderId, Product, ProductId, ProductSummary, Result};

/// Authoritative document store for products and orders.
///
/// Implementations validate inputs, stamp `created_at`, and hand back ids
/// as plain strings regardless of the native id type.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a product and returns its id.
    async fn insert_product(&self, product: NewProduct) -> Result<ProductId>;

    /// Looks a product up by id. Returns None if it doesn't exist.
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Lists every product through the listing projection.
    async fn list_products(&self) -> Result<Vec<ProductSummary>>;

    /// Persists an order as a single document and returns its id.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId>;
}

#[async_trait]
impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    async fn insert_product(&self, product: NewProduct) -> Result<ProductId> {
        (**self).insert_product(product).await
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        (**self).find_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>> {
        (**self).list_products().await
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderId> {
        (**self).insert_order(order).await
    }
}
