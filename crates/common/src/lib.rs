//! Shared identifier types used across the catalog, cache, and event stores.

pub mod types;

pub use types::{OrderId, ProductId};
