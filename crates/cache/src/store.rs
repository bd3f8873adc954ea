use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Key-value and sorted-score operations used by the read path.
///
/// Counters and scores are updated atomically by the backend; callers never
/// read-modify-write.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value, expiring after `ttl_secs`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Atomically adds one to the integer at `key` (missing counts as 0) and returns the new value.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Atomically adds `delta` to `member`'s score in `set` and returns the new score.
    async fn add_score(&self, set: &str, member: &str, delta: f64) -> Result<f64>;

    /// Returns up to `n` members of `set`, highest score first.
    ///
    /// Equal scores are ordered by member, descending.
    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<(String, f64)>>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        (**self).set_with_ttl(key, value, ttl_secs).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        (**self).increment(key).await
    }

    async fn add_score(&self, set: &str, member: &str, delta: f64) -> Result<f64> {
        (**self).add_score(set, member, delta).await
    }

    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<(String, f64)>> {
        (**self).top_n(set, n).await
    }
}
