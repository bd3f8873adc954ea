use std::sync::Arc;

use async_trait::async_trait;

use crate::{Event, EventStoreError, PartitionKey, Result};

/// Core trait for partitioned event log implementations.
///
/// The log is partitioned by `(product_id, event_date)`; there is no query
/// that spans partitions. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a single event to its partition.
    ///
    /// Partitions are append-only: events are never updated or deleted.
    async fn insert_event(&self, event: Event) -> Result<()>;

    /// Reads up to `limit` events from one partition.
    ///
    /// Events are returned newest first by `event_time`.
    async fn select_by_partition(&self, key: &PartitionKey, limit: usize) -> Result<Vec<Event>>;
}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn insert_event(&self, event: Event) -> Result<()> {
        (**self).insert_event(event).await
    }

    async fn select_by_partition(&self, key: &PartitionKey, limit: usize) -> Result<Vec<Event>> {
        (**self).select_by_partition(key, limit).await
    }
}

/// Validates an event before it is written.
pub fn validate_event(event: &Event) -> Result<()> {
    if event.product_id.as_str().is_empty() {
        return Err(EventStoreError::InvalidEvent(
            "product_id must not be empty".to_string(),
        ));
    }

    // The partition day must agree with the timestamp or the event would be
    // invisible to day-bounded reads.
    if event.event_time.date_naive() != event.event_date {
        return Err(EventStoreError::InvalidEvent(format!(
            "event_date {} does not match event_time {}",
            event.event_date, event.event_time
        )));
    }

    Ok(())
}
