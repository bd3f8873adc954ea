use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    CatalogError, CatalogStore, NewOrder, NewProduct, Order, OrderId, Product, ProductId,
    ProductSummary, Result,
};

/// In-memory catalog for testing and local runs.
///
/// Listing returns products in insertion order, like a document store's
/// natural order.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<Vec<Product>>>,
    orders: Arc<RwLock<Vec<Order>>>,
    lookups: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many `find_product` calls reached this store.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Makes every operation fail with a backend error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns a stored order.
    pub async fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|order| &order.id == id)
            .cloned()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Backend("catalog unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_product(&self, product: NewProduct) -> Result<ProductId> {
        product.validate()?;
        self.check_available()?;

        let id = ProductId::generate();
        self.products
            .write()
            .await
            .push(product.into_product(id.clone(), Utc::now()));
        Ok(id)
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let products = self.products.read().await;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>> {
        self.check_available()?;

        let products = self.products.read().await;
        Ok(products.iter().map(ProductSummary::from).collect())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderId> {
        order.validate()?;
        self.check_available()?;

        let id = OrderId::generate();
        self.orders
            .write()
            .await
            .push(order.into_order(id.clone(), Utc::now()));
        Ok(id)
    }
}
