use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{CacheError, CacheStore, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    values: HashMap<String, Entry>,
    scores: HashMap<String, HashMap<String, f64>>,
}

/// In-memory cache and ranking store for testing and local runs.
///
/// Expiry follows `tokio::time`, so paused-clock tests can advance past a TTL.
/// Counters share the value space like Redis `INCR` does.
#[derive(Clone, Default)]
pub struct InMemoryCacheStore {
    state: Arc<RwLock<CacheState>>,
    unavailable: Arc<AtomicBool>,
    write_stall: Arc<RwLock<Option<Duration>>>,
    sets: Arc<AtomicUsize>,
}

impl InMemoryCacheStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with a backend error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every counter and score update by `delay`.
    pub async fn stall_writes(&self, delay: Duration) {
        *self.write_stall.write().await = Some(delay);
    }

    /// Returns how many `set_with_ttl` calls succeeded.
    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Remaining time to live of a key, or None if absent or persistent.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let state = self.state.read().await;
        state
            .values
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at - now)
    }

    /// Current score of a member, if ranked.
    pub async fn score(&self, set: &str, member: &str) -> Option<f64> {
        let state = self.state.read().await;
        state.scores.get(set).and_then(|s| s.get(member)).copied()
    }

    /// Drops every key and ranking.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.values.clear();
        state.scores.clear();
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("cache unavailable".to_string()));
        }
        Ok(())
    }

    async fn maybe_stall(&self) {
        let stall = *self.write_stall.read().await;
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Highest score first; ties by member, descending.
fn ranking_order(a: &(String, f64), b: &(String, f64)) -> CmpOrdering {
    b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0))
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.check_available()?;

        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
        };
        self.state
            .write()
            .await
            .values
            .insert(key.to_string(), entry);
        self.sets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;

        let now = Instant::now();
        let state = self.state.read().await;
        Ok(state
            .values
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        self.check_available()?;
        self.maybe_stall().await;

        let now = Instant::now();
        let mut state = self.state.write().await;

        let current = match state.values.get(key).filter(|entry| entry.is_live(now)) {
            Some(entry) => entry
                .value
                .parse::<i64>()
                .map_err(|_| CacheError::NotAnInteger {
                    key: key.to_string(),
                })?,
            None => 0,
        };

        let next = current + 1;
        let expires_at = state.values.get(key).and_then(|entry| entry.expires_at);
        state.values.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: expires_at.filter(|at| *at > now),
            },
        );
        Ok(next)
    }

    async fn add_score(&self, set: &str, member: &str, delta: f64) -> Result<f64> {
        self.check_available()?;
        self.maybe_stall().await;

        let mut state = self.state.write().await;
        let score = state
            .scores
            .entry(set.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<(String, f64)>> {
        self.check_available()?;

        let state = self.state.read().await;
        let Some(scores) = state.scores.get(set) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(String, f64)> = scores
            .iter()
            .map(|(member, score)| (member.clone(), *score))
            .collect();
        ranked.sort_by(ranking_order);
        ranked.truncate(n);
        Ok(ranked)
    }
}
