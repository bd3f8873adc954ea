//! Cache-aside product lookup with popularity side effects.

use std::future::Future;
use std::time::{Duration, Instant};

use cache::{CacheError, CacheStore, keys};
use catalog::{CatalogStore, NewProduct, Product, ProductSummary};
use common::ProductId;
use event_store::{Event, EventKind};
use serde::Serialize;
use tracing::{debug, warn};

use super::{VIEW_SOURCE, Viewer};
use crate::{DomainError, EventRecorder, Result};

/// Tuning for [`ProductService`].
#[derive(Debug, Clone)]
pub struct ProductServiceConfig {
    /// Lifetime of a cached product snapshot.
    pub cache_ttl_secs: u64,
    /// Upper bound for each cache call made on the lookup path.
    pub side_effect_timeout: Duration,
}

impl Default for ProductServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 1800,
            side_effect_timeout: Duration::from_millis(500),
        }
    }
}

/// A leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProduct {
    pub product_id: ProductId,
    pub score: f64,
}

/// Service for reading and creating products.
///
/// Lookups go to the cache first and fall back to the catalog. Every
/// successful lookup, hit or miss, bumps the view counter and leaderboard
/// and records a `view` event. Those side effects are bounded by
/// `side_effect_timeout` and their failures are swallowed.
pub struct ProductService<C, K> {
    catalog: C,
    cache: K,
    recorder: EventRecorder,
    config: ProductServiceConfig,
}

impl<C: CatalogStore, K: CacheStore> ProductService<C, K> {
    /// Creates a new product service with default tuning.
    pub fn new(catalog: C, cache: K, recorder: EventRecorder) -> Self {
        Self::with_config(catalog, cache, recorder, ProductServiceConfig::default())
    }

    pub fn with_config(
        catalog: C,
        cache: K,
        recorder: EventRecorder,
        config: ProductServiceConfig,
    ) -> Self {
        Self {
            catalog,
            cache,
            recorder,
            config,
        }
    }

    /// Returns a reference to the catalog store.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns a reference to the cache store.
    pub fn cache(&self) -> &K {
        &self.cache
    }

    /// Creates a product in the catalog.
    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<ProductId> {
        let id = self.catalog.insert_product(product).await?;
        debug!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Lists every product in its summary form.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>> {
        Ok(self.catalog.list_products().await?)
    }

    /// Looks a product up and records the view.
    ///
    /// Fails with [`DomainError::ProductNotFound`] when the catalog has no
    /// such product; nothing is recorded in that case.
    #[tracing::instrument(skip(self), fields(user_id = %viewer.user_id))]
    pub async fn get_product(&self, id: &ProductId, viewer: &Viewer) -> Result<Product> {
        let started = Instant::now();

        let product = match self.cached(id).await {
            Some(product) => {
                metrics::counter!("product_cache_hits_total").increment(1);
                product
            }
            None => {
                metrics::counter!("product_cache_misses_total").increment(1);
                let product = self
                    .catalog
                    .find_product(id)
                    .await?
                    .ok_or_else(|| DomainError::ProductNotFound(id.clone()))?;
                self.populate(id, &product).await;
                product
            }
        };

        self.record_view(id, viewer).await;

        metrics::histogram!("product_lookup_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(product)
    }

    /// Current view count of a product, 0 if never viewed.
    #[tracing::instrument(skip(self))]
    pub async fn view_count(&self, id: &ProductId) -> Result<i64> {
        let key = keys::product_views(id);
        match self.cache.get(&key).await? {
            Some(raw) => raw
                .parse()
                .map_err(|_| DomainError::Cache(CacheError::NotAnInteger { key })),
            None => Ok(0),
        }
    }

    /// The `n` most viewed products, highest score first.
    #[tracing::instrument(skip(self))]
    pub async fn top_products(&self, n: usize) -> Result<Vec<RankedProduct>> {
        let ranked = self.cache.top_n(keys::TOP_PRODUCTS, n).await?;
        Ok(ranked
            .into_iter()
            .map(|(member, score)| RankedProduct {
                product_id: ProductId::new(member),
                score,
            })
            .collect())
    }

    /// Reads the cached snapshot. Errors and undecodable payloads count as a miss.
    async fn cached(&self, id: &ProductId) -> Option<Product> {
        let raw = self
            .bounded("cache_read", self.cache.get(&keys::product_snapshot(id)))
            .await
            .flatten()?;

        match serde_json::from_str(&raw) {
            Ok(product) => Some(product),
            Err(error) => {
                warn!(product_id = %id, error = %error, "Discarding undecodable cached product");
                None
            }
        }
    }

    async fn populate(&self, id: &ProductId, product: &Product) {
        let snapshot = match serde_json::to_string(product) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(product_id = %id, error = %error, "Product snapshot not cacheable");
                return;
            }
        };

        let key = keys::product_snapshot(id);
        self.bounded(
            "cache_write",
            self.cache
                .set_with_ttl(&key, &snapshot, self.config.cache_ttl_secs),
        )
        .await;
    }

    async fn record_view(&self, id: &ProductId, viewer: &Viewer) {
        let counter_key = keys::product_views(id);
        tokio::join!(
            self.bounded("view_counter", self.cache.increment(&counter_key)),
            self.bounded(
                "leaderboard",
                self.cache.add_score(keys::TOP_PRODUCTS, id.as_str(), 1.0)
            ),
        );

        let event = Event::now(
            id.clone(),
            EventKind::View,
            viewer.user_id.clone(),
            viewer.session_id.clone(),
        )
        .with_prop("source", VIEW_SOURCE);
        self.recorder.record(event);

        metrics::counter!("product_views_recorded_total").increment(1);
    }

    /// Runs one cache call under the side-effect timeout. Failures are
    /// logged, counted by `effect`, and turned into None.
    async fn bounded<T>(
        &self,
        effect: &'static str,
        call: impl Future<Output = cache::Result<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.config.side_effect_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(error)) => {
                metrics::counter!("side_effect_failures_total", "effect" => effect).increment(1);
                warn!(effect, error = %error, "Cache call failed");
                None
            }
            Err(_) => {
                metrics::counter!("side_effect_failures_total", "effect" => effect).increment(1);
                warn!(
                    effect,
                    timeout_ms = self.config.side_effect_timeout.as_millis() as u64,
                    "Cache call timed out"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cache::InMemoryCacheStore;
    use catalog::InMemoryCatalogStore;
    use event_store::{EventStore, InMemoryEventStore};

    use super::*;

    struct Fixture {
        catalog: InMemoryCatalogStore,
        cache: InMemoryCacheStore,
        events: InMemoryEventStore,
        recorder: EventRecorder,
        service: ProductService<InMemoryCatalogStore, InMemoryCacheStore>,
    }

    fn fixture(config: ProductServiceConfig) -> Fixture {
        let catalog = InMemoryCatalogStore::new();
        let cache = InMemoryCacheStore::new();
        let events = InMemoryEventStore::new();
        let recorder = EventRecorder::new(Arc::new(events.clone()));
        let service =
            ProductService::with_config(catalog.clone(), cache.clone(), recorder.clone(), config);

        Fixture {
            catalog,
            cache,
            events,
            recorder,
            service,
        }
    }

    async fn create_keyboard(f: &Fixture) -> ProductId {
        f.service
            .create_product(
                NewProduct::new("Mechanical Keyboard", 79.99)
                    .category("peripherals")
                    .attribute("switch", "blue"),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn miss_populates_cache_with_ttl() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;

        f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();

        let key = keys::product_snapshot(&id);
        assert!(f.cache.get(&key).await.unwrap().is_some());
        let ttl = f.cache.ttl(&key).await.unwrap();
        assert!(ttl <= Duration::from_secs(1800) && ttl > Duration::from_secs(1790));
    }

    #[tokio::test]
    async fn hit_skips_catalog_and_matches_miss() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;

        let from_store = f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();
        let from_cache = f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();

        assert_eq!(from_store, from_cache);
        assert_eq!(f.catalog.lookup_count(), 1);
        assert_eq!(f.service.view_count(&id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn undecodable_snapshot_is_a_miss() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;
        f.cache
            .set_with_ttl(&keys::product_snapshot(&id), "not json", 60)
            .await
            .unwrap();

        let product = f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();

        assert_eq!(product.name, "Mechanical Keyboard");
        assert_eq!(f.catalog.lookup_count(), 1);
        let cached = f.cache.get(&keys::product_snapshot(&id)).await.unwrap().unwrap();
        assert_ne!(cached, "not json");
    }

    #[tokio::test]
    async fn view_event_carries_viewer_and_source() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;

        let viewer = Viewer::new(Some("u-7".into()), Some("s-7".into()));
        f.service.get_product(&id, &viewer).await.unwrap();
        f.recorder.drain().await;

        let event = Event::now(id.clone(), EventKind::View, "", "");
        let stored = f
            .events
            .select_by_partition(&event.partition_key(), 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, "u-7");
        assert_eq!(stored[0].session_id, "s-7");
        assert_eq!(stored[0].kind, EventKind::View);
        assert_eq!(stored[0].props.get("source").map(String::as_str), Some("api"));
    }

    #[tokio::test]
    async fn missing_product_has_no_side_effects() {
        let f = fixture(ProductServiceConfig::default());
        let id = ProductId::new("nope");

        let result = f.service.get_product(&id, &Viewer::anonymous()).await;

        assert!(matches!(result, Err(DomainError::ProductNotFound(_))));
        f.recorder.drain().await;
        assert_eq!(f.events.event_count().await, 0);
        assert_eq!(f.service.view_count(&id).await.unwrap(), 0);
        assert!(f.service.top_products(10).await.unwrap().is_empty());
        assert_eq!(f.cache.set_count(), 0);
    }

    #[tokio::test]
    async fn unavailable_cache_still_serves_from_catalog() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;
        f.cache.set_unavailable(true);

        let product = f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();
        f.recorder.drain().await;

        assert_eq!(product.id, id);
        assert_eq!(f.events.event_count().await, 1);
    }

    #[tokio::test]
    async fn failing_event_log_does_not_fail_lookup() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;
        f.events.reject_inserts_for(id.clone()).await;

        assert!(f.service.get_product(&id, &Viewer::anonymous()).await.is_ok());
        f.recorder.drain().await;
        assert_eq!(f.events.event_count().await, 0);
        assert_eq!(f.service.view_count(&id).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_counters_are_cut_off() {
        let f = fixture(ProductServiceConfig {
            side_effect_timeout: Duration::from_millis(50),
            ..ProductServiceConfig::default()
        });
        let id = create_keyboard(&f).await;
        f.cache.stall_writes(Duration::from_secs(30)).await;

        let started = tokio::time::Instant::now();
        f.service.get_product(&id, &Viewer::anonymous()).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn catalog_failure_surfaces() {
        let f = fixture(ProductServiceConfig::default());
        let id = create_keyboard(&f).await;
        f.catalog.set_unavailable(true);

        let result = f.service.get_product(&id, &Viewer::anonymous()).await;
        assert!(matches!(result, Err(DomainError::Catalog(_))));
    }

    #[tokio::test]
    async fn invalid_product_is_a_validation_error() {
        let f = fixture(ProductServiceConfig::default());
        let result = f.service.create_product(NewProduct::new("", 10.0)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
