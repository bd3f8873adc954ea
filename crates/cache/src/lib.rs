//! Cache and ranking store for the product read path.
//!
//! This crate provides:
//! - [`CacheStore`] trait: TTL'd values, atomic counters and sorted scores
//! - [`InMemoryCacheStore`] for tests and local runs
//! - `RedisCacheStore` behind the `redis` feature
//! - [`keys`] builders for the product snapshot, view counter and leaderboard keys

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod store;

pub use error::{CacheError, Result};
pub use memory::InMemoryCacheStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisCacheStore;
pub use store::CacheStore;
