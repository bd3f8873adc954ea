//! Authoritative catalog store: products and orders.
//!
//! This crate provides:
//! - [`Product`], [`NewProduct`], [`ProductSummary`] and the order types
//! - [`CatalogStore`] trait for point lookups and inserts keyed by id
//! - [`InMemoryCatalogStore`] for tests and local runs
//! - `MongoCatalogStore` behind the `mongodb` feature
//! - [`seed::sample_products`] for populating an empty catalog

pub mod error;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod order;
pub mod product;
pub mod seed;
pub mod store;

pub use common::{OrderId, ProductId};
pub use error::{CatalogError, Result, ValidationError};
pub use memory::InMemoryCatalogStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoCatalogStore;
pub use order::{NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductSummary};
pub use store::CatalogStore;
