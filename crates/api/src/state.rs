//! Shared application state and store handles.

use std::sync::Arc;

use cache::{CacheStore, InMemoryCacheStore};
use catalog::{CatalogStore, InMemoryCatalogStore};
use domain::{EventRecorder, OrderService, ProductService, ProductServiceConfig};
use event_store::{EventStore, InMemoryEventStore};
use timeline::{TimelineConfig, TimelineQueryEngine};

use crate::config::Config;

pub type SharedCatalog = Arc<dyn CatalogStore>;
pub type SharedCache = Arc<dyn CacheStore>;
pub type SharedEvents = Arc<dyn EventStore>;

/// Connected store handles, chosen at startup.
#[derive(Clone)]
pub struct Stores {
    pub catalog: SharedCatalog,
    pub cache: SharedCache,
    pub events: SharedEvents,
}

impl Stores {
    /// All three stores in memory.
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalogStore::new()),
            cache: Arc::new(InMemoryCacheStore::new()),
            events: Arc::new(InMemoryEventStore::new()),
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub products: ProductService<SharedCatalog, SharedCache>,
    pub orders: OrderService<SharedCatalog>,
    pub timeline: TimelineQueryEngine<SharedEvents>,
    pub recorder: EventRecorder,
}

impl AppState {
    /// Wires the services over `stores`.
    pub fn new(stores: Stores, config: &Config) -> Self {
        let recorder = EventRecorder::new(Arc::clone(&stores.events));

        let products = ProductService::with_config(
            Arc::clone(&stores.catalog),
            Arc::clone(&stores.cache),
            recorder.clone(),
            ProductServiceConfig {
                cache_ttl_secs: config.cache_ttl_secs,
                side_effect_timeout: config.side_effect_timeout,
            },
        );
        let orders = OrderService::new(Arc::clone(&stores.catalog), recorder.clone());
        let timeline = TimelineQueryEngine::with_config(
            stores.events,
            TimelineConfig {
                partition_timeout: config.partition_timeout,
                default_limit: config.timeline_default_limit,
                default_days: config.timeline_default_days,
                max_days: config.timeline_max_days,
            },
        );

        Self {
            products,
            orders,
            timeline,
            recorder,
        }
    }
}
