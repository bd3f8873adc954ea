//! Store selection and startup connection retries.
//!
//! Each store is real when its URL is configured (and the matching feature is
//! compiled in), otherwise in memory.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use cache::InMemoryCacheStore;
use catalog::{CatalogError, InMemoryCatalogStore};
use event_store::{InMemoryEventStore, PostgresEventStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::state::{SharedCache, SharedCatalog, SharedEvents, Stores};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A store never answered within the retry budget.
    #[error("{backend} unavailable after {attempts} attempts: {reason}")]
    Unavailable {
        backend: &'static str,
        attempts: u32,
        reason: String,
    },

    /// Seeding the catalog failed.
    #[error("Seeding catalog failed: {0}")]
    Seed(#[from] CatalogError),
}

/// Connects every configured store, retrying each per the config.
pub async fn connect_stores(config: &Config) -> Result<Stores, StartupError> {
    Ok(Stores {
        catalog: connect_catalog(config).await?,
        cache: connect_cache(config).await?,
        events: connect_events(config).await?,
    })
}

/// Inserts the sample catalog when the store is empty.
pub async fn seed_catalog(stores: &Stores) -> Result<usize, StartupError> {
    let ids = catalog::seed::seed_if_empty(stores.catalog.as_ref()).await?;
    Ok(ids.len())
}

/// Calls `connect` until it succeeds or the attempts run out.
pub async fn with_retries<T, E, F, Fut>(
    backend: &'static str,
    config: &Config,
    mut connect: F,
) -> Result<T, StartupError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = config.connect_retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match connect().await {
            Ok(handle) => {
                info!(backend, attempt, "Connected");
                return Ok(handle);
            }
            Err(error) => {
                warn!(backend, attempt, attempts, error = %error, "Connect attempt failed");
                last_error = error.to_string();
                if attempt < attempts {
                    tokio::time::sleep(config.connect_delay).await;
                }
            }
        }
    }

    Err(StartupError::Unavailable {
        backend,
        attempts,
        reason: last_error,
    })
}

async fn connect_events(config: &Config) -> Result<SharedEvents, StartupError> {
    let Some(url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set, using in-memory event log");
        return Ok(Arc::new(InMemoryEventStore::new()));
    };

    let store =
        with_retries("postgres", config, || PostgresEventStore::connect(url, 10)).await?;
    Ok(Arc::new(store))
}

#[cfg(feature = "redis")]
async fn connect_cache(config: &Config) -> Result<SharedCache, StartupError> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("REDIS_URL not set, using in-memory cache");
        return Ok(Arc::new(InMemoryCacheStore::new()));
    };

    let store = with_retries("redis", config, || cache::RedisCacheStore::new(url)).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
async fn connect_cache(config: &Config) -> Result<SharedCache, StartupError> {
    if config.redis_url.is_some() {
        warn!("REDIS_URL set but the `redis` feature is not enabled, using in-memory cache");
    }
    Ok(Arc::new(InMemoryCacheStore::new()))
}

#[cfg(feature = "mongodb")]
async fn connect_catalog(config: &Config) -> Result<SharedCatalog, StartupError> {
    let Some(uri) = config.mongo_uri.as_deref() else {
        info!("MONGO_URI not set, using in-memory catalog");
        return Ok(Arc::new(InMemoryCatalogStore::new()));
    };

    let database = config.mongo_database.as_str();
    let store = with_retries("mongodb", config, || {
        catalog::MongoCatalogStore::connect(uri, database)
    })
    .await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_catalog(config: &Config) -> Result<SharedCatalog, StartupError> {
    if config.mongo_uri.is_some() {
        warn!("MONGO_URI set but the `mongodb` feature is not enabled, using in-memory catalog");
    }
    Ok(Arc::new(InMemoryCatalogStore::new()))
}
