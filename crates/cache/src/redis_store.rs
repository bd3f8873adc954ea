//! Redis cache and ranking store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

use crate::{CacheStore, Result};

/// Redis implementation of [`CacheStore`].
///
/// Values map to `SETEX`/`GET`, counters to `INCR` and rankings to a sorted
/// set read with `ZREVRANGE ... WITHSCORES`.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    /// Connects to Redis at `url` (e.g. `redis://localhost:6379`).
    pub async fn new(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!(url = %url, "Connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;

        debug!(key = %key, ttl_secs, "Stored value in Redis");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1_i64).await?;
        Ok(value)
    }

    async fn add_score(&self, set: &str, member: &str, delta: f64) -> Result<f64> {
        let mut conn = self.conn.clone();
        let score: f64 = conn.zincr(set, member, delta).await?;
        Ok(score)
    }

    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<(String, f64)>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let stop = isize::try_from(n - 1).unwrap_or(isize::MAX);
        let ranked: Vec<(String, f64)> = conn.zrevrange_withscores(set, 0, stop).await?;
        Ok(ranked)
    }
}
