use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Event, EventStoreError, PartitionKey, ProductId, Result,
    store::{EventStore, validate_event},
};

/// Number of partition reads remembered for inspection.
const READ_LOG_CAPACITY: usize = 1024;

/// Injected failures, used to exercise degraded read and write paths.
#[derive(Debug, Default)]
struct Faults {
    failing_partitions: HashSet<PartitionKey>,
    stalled_partitions: HashMap<PartitionKey, Duration>,
    rejected_products: HashSet<ProductId>,
}

/// In-memory event store implementation for testing and local runs.
///
/// Partitions are kept sorted newest-first so reads behave like the
/// clustering order of the PostgreSQL table.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    partitions: Arc<RwLock<HashMap<PartitionKey, Vec<Event>>>>,
    faults: Arc<RwLock<Faults>>,
    reads: Arc<RwLock<VecDeque<(PartitionKey, usize)>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.partitions.read().await.values().map(Vec::len).sum()
    }

    /// Returns the most recent partition reads with their requested limits,
    /// in call order.
    pub async fn partition_reads(&self) -> Vec<(PartitionKey, usize)> {
        self.reads.read().await.iter().cloned().collect()
    }

    /// Makes reads of `key` fail until cleared.
    pub async fn fail_partition(&self, key: PartitionKey) {
        self.faults.write().await.failing_partitions.insert(key);
    }

    /// Makes reads of `key` sleep for `delay` before answering.
    pub async fn stall_partition(&self, key: PartitionKey, delay: Duration) {
        self.faults
            .write()
            .await
            .stalled_partitions
            .insert(key, delay);
    }

    /// Makes inserts for `product_id` fail until cleared.
    pub async fn reject_inserts_for(&self, product_id: ProductId) {
        self.faults
            .write()
            .await
            .rejected_products
            .insert(product_id);
    }

    /// Clears all events, recorded reads, and injected faults.
    pub async fn clear(&self) {
        self.partitions.write().await.clear();
        self.reads.write().await.clear();
        *self.faults.write().await = Faults::default();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert_event(&self, event: Event) -> Result<()> {
        validate_event(&event)?;

        let key = event.partition_key();
        if self
            .faults
            .read()
            .await
            .rejected_products
            .contains(&event.product_id)
        {
            return Err(EventStoreError::Unavailable {
                partition: key,
                reason: "insert rejected".to_string(),
            });
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(key).or_default();

        // Keep newest-first; equal timestamps keep insertion order.
        let pos = partition.partition_point(|e| e.event_time >= event.event_time);
        partition.insert(pos, event);

        Ok(())
    }

    async fn select_by_partition(&self, key: &PartitionKey, limit: usize) -> Result<Vec<Event>> {
        {
            let mut reads = self.reads.write().await;
            if reads.len() == READ_LOG_CAPACITY {
                reads.pop_front();
            }
            reads.push_back((key.clone(), limit));
        }

        let stall = {
            let faults = self.faults.read().await;
            if faults.failing_partitions.contains(key) {
                return Err(EventStoreError::Unavailable {
                    partition: key.clone(),
                    reason: "injected failure".to_string(),
                });
            }
            faults.stalled_partitions.get(key).copied()
        };

        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }

        let partitions = self.partitions.read().await;
        let events = partitions
            .get(key)
            .map(|events| events.iter().take(limit).cloned().collect())
            .unwrap_or_default();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::EventKind;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn create_test_event(product: &str, event_time: DateTime<Utc>) -> Event {
        Event::builder()
            .product_id(product)
            .kind(EventKind::View)
            .event_time(event_time)
            .user_id("user-1")
            .session_id("session-1")
            .build()
    }

    #[tokio::test]
    async fn insert_and_select_single_event() {
        let store = InMemoryEventStore::new();
        let event = create_test_event("p-1", at(10, 9));
        let key = event.partition_key();

        store.insert_event(event.clone()).await.unwrap();

        let events = store.select_by_partition(&key, 10).await.unwrap();
        assert_eq!(events, vec![event]);
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn partition_is_returned_newest_first() {
        let store = InMemoryEventStore::new();
        for hour in [3, 15, 9] {
            store
                .insert_event(create_test_event("p-1", at(10, hour)))
                .await
                .unwrap();
        }

        let key = PartitionKey::new(ProductId::new("p-1"), at(10, 0).date_naive());
        let events = store.select_by_partition(&key, 10).await.unwrap();
        let hours: Vec<_> = events
            .iter()
            .map(|e| e.event_time.format("%H").to_string())
            .collect();
        assert_eq!(hours, vec!["15", "09", "03"]);
    }

    #[tokio::test]
    async fn select_honours_limit() {
        let store = InMemoryEventStore::new();
        for hour in 0..5 {
            store
                .insert_event(create_test_event("p-1", at(10, hour)))
                .await
                .unwrap();
        }

        let key = PartitionKey::new(ProductId::new("p-1"), at(10, 0).date_naive());
        let events = store.select_by_partition(&key, 2).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_time, at(10, 4));
        assert_eq!(events[1].event_time, at(10, 3));
    }

    #[tokio::test]
    async fn partitions_are_isolated_by_product_and_day() {
        let store = InMemoryEventStore::new();
        store
            .insert_event(create_test_event("p-1", at(10, 1)))
            .await
            .unwrap();
        store
            .insert_event(create_test_event("p-1", at(11, 1)))
            .await
            .unwrap();
        store
            .insert_event(create_test_event("p-2", at(10, 1)))
            .await
            .unwrap();

        let key = PartitionKey::new(ProductId::new("p-1"), at(10, 0).date_naive());
        assert_eq!(store.select_by_partition(&key, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_partition_is_empty() {
        let store = InMemoryEventStore::new();
        let key = PartitionKey::new(ProductId::new("nope"), at(10, 0).date_naive());
        assert!(store.select_by_partition(&key, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_partition_returns_unavailable() {
        let store = InMemoryEventStore::new();
        let key = PartitionKey::new(ProductId::new("p-1"), at(10, 0).date_naive());
        store.fail_partition(key.clone()).await;

        let result = store.select_by_partition(&key, 10).await;
        assert!(matches!(result, Err(EventStoreError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn rejected_product_inserts_fail_without_storing() {
        let store = InMemoryEventStore::new();
        store.reject_inserts_for(ProductId::new("p-1")).await;

        let result = store.insert_event(create_test_event("p-1", at(10, 1))).await;
        assert!(result.is_err());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn records_partition_reads_in_order() {
        let store = InMemoryEventStore::new();
        let day10 = PartitionKey::new(ProductId::new("p-1"), at(10, 0).date_naive());
        let day9 = PartitionKey::new(ProductId::new("p-1"), at(9, 0).date_naive());

        store.select_by_partition(&day10, 5).await.unwrap();
        store.select_by_partition(&day9, 3).await.unwrap();

        assert_eq!(store.partition_reads().await, vec![(day10, 5), (day9, 3)]);
    }

    #[tokio::test]
    async fn clear_resets_events_and_faults() {
        let store = InMemoryEventStore::new();
        let event = create_test_event("p-1", at(10, 1));
        let key = event.partition_key();
        store.insert_event(event).await.unwrap();
        store.fail_partition(key.clone()).await;

        store.clear().await;

        assert_eq!(store.event_count().await, 0);
        assert!(store.select_by_partition(&key, 1).await.unwrap().is_empty());
    }
}
