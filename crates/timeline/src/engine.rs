use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use common::ProductId;
use event_store::{Event, EventStore, PartitionKey};
use tracing::{debug, warn};

use crate::TimelineWindow;

/// Tuning for timeline reads.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Upper bound for a single partition read; slower reads count as failed.
    pub partition_timeout: Duration,
    /// Limit used when the caller gives none.
    pub default_limit: usize,
    /// Days covered when the caller gives no start date.
    pub default_days: u32,
    /// Longest window scanned; older days of a longer window are dropped.
    pub max_days: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            partition_timeout: Duration::from_secs(2),
            default_limit: 100,
            default_days: 7,
            max_days: 366,
        }
    }
}

/// Reconstructs a product's event timeline from day partitions.
///
/// Partitions are read one at a time from the newest day backwards, each
/// asking only for the rows still missing, so a busy recent day ends the
/// scan without touching older partitions.
pub struct TimelineQueryEngine<E> {
    store: E,
    config: TimelineConfig,
}

impl<E: EventStore> TimelineQueryEngine<E> {
    pub fn new(store: E) -> Self {
        Self::with_config(store, TimelineConfig::default())
    }

    pub fn with_config(store: E, config: TimelineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Resolves request bounds against today's UTC date and the defaults.
    ///
    /// The result is not clamped to `max_days`.
    pub fn window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> TimelineWindow {
        TimelineWindow::resolve(
            start,
            end,
            limit.unwrap_or(self.config.default_limit),
            Utc::now().date_naive(),
            self.config.default_days,
        )
    }

    /// Returns at most `limit` events of `product_id` in `[start, end]`, newest first.
    ///
    /// Missing bounds default to the last `default_days` UTC days and a
    /// missing limit to `default_limit`. Only the newest `max_days` days of
    /// the window are scanned.
    pub async fn get_timeline(
        &self,
        product_id: &ProductId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Vec<Event> {
        let window = self
            .window(start, end, limit)
            .clamp_days(self.config.max_days);
        self.query(product_id, &window).await
    }

    /// Scans a resolved window.
    #[tracing::instrument(
        skip(self, window),
        fields(start = %window.start(), end = %window.end(), limit = window.limit())
    )]
    pub async fn query(&self, product_id: &ProductId, window: &TimelineWindow) -> Vec<Event> {
        let started = Instant::now();
        let limit = window.limit();
        let mut events: Vec<Event> = Vec::with_capacity(limit.min(1024));

        for day in window.partitions() {
            let remaining = limit.saturating_sub(events.len());
            if remaining == 0 {
                break;
            }

            let key = PartitionKey::new(product_id.clone(), day);
            if let Some(rows) = self.read_partition(&key, remaining).await {
                events.extend(rows);
            }
        }

        // Stable: equal timestamps keep partition read order.
        events.sort_by(|a, b| b.event_time.cmp(&a.event_time));
        events.truncate(limit);

        metrics::histogram!("timeline_query_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        debug!(returned = events.len(), "Timeline assembled");

        events
    }

    /// One bounded read. Failures and timeouts are logged and yield None.
    async fn read_partition(&self, key: &PartitionKey, limit: usize) -> Option<Vec<Event>> {
        metrics::counter!("timeline_partition_reads_total").increment(1);

        match tokio::time::timeout(
            self.config.partition_timeout,
            self.store.select_by_partition(key, limit),
        )
        .await
        {
            Ok(Ok(rows)) => Some(rows),
            Ok(Err(error)) => {
                metrics::counter!("timeline_partition_failures_total", "reason" => "error")
                    .increment(1);
                warn!(partition = %key, error = %error, "Partition read failed, skipping day");
                None
            }
            Err(_) => {
                metrics::counter!("timeline_partition_failures_total", "reason" => "timeout")
                    .increment(1);
                warn!(
                    partition = %key,
                    timeout_ms = self.config.partition_timeout.as_millis() as u64,
                    "Partition read timed out, skipping day"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};
    use event_store::{EventKind, InMemoryEventStore};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, minute, 0).unwrap()
    }

    fn view(product: &str, time: DateTime<Utc>) -> Event {
        Event::builder()
            .product_id(product)
            .kind(EventKind::View)
            .event_time(time)
            .user_id("u-1")
            .session_id("s-1")
            .build()
    }

    async fn seed(store: &InMemoryEventStore, product: &str, d: u32, count: u32) {
        for minute in 0..count {
            store.insert_event(view(product, at(d, minute))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn stops_reading_once_limit_is_met() {
        let store = InMemoryEventStore::new();
        seed(&store, "p-1", 10, 5).await;
        seed(&store, "p-1", 9, 5).await;

        let engine = TimelineQueryEngine::new(store.clone());
        let window = TimelineWindow::new(day(1), day(10), 3);
        let events = engine.query(&ProductId::new("p-1"), &window).await;

        assert_eq!(events.len(), 3);
        let reads = store.partition_reads().await;
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0], (PartitionKey::new(ProductId::new("p-1"), day(10)), 3));
    }

    #[tokio::test]
    async fn empty_store_yields_empty_timeline() {
        let store = InMemoryEventStore::new();
        let engine = TimelineQueryEngine::new(store.clone());

        let window = TimelineWindow::new(day(1), day(7), 50);
        let events = engine.query(&ProductId::new("p-1"), &window).await;

        assert!(events.is_empty());
        assert_eq!(store.partition_reads().await.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_partition_times_out_and_is_skipped() {
        let store = InMemoryEventStore::new();
        seed(&store, "p-1", 5, 2).await;
        seed(&store, "p-1", 4, 2).await;
        store
            .stall_partition(
                PartitionKey::new(ProductId::new("p-1"), day(5)),
                Duration::from_secs(60),
            )
            .await;

        let config = TimelineConfig {
            partition_timeout: Duration::from_millis(50),
            ..TimelineConfig::default()
        };
        let engine = TimelineQueryEngine::with_config(store, config);
        let window = TimelineWindow::new(day(4), day(5), 10);
        let events = engine.query(&ProductId::new("p-1"), &window).await;

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event_date == day(4)));
    }

    #[tokio::test]
    async fn other_products_are_not_mixed_in() {
        let store = InMemoryEventStore::new();
        seed(&store, "p-1", 3, 2).await;
        seed(&store, "p-2", 3, 4).await;

        let engine = TimelineQueryEngine::new(store);
        let window = TimelineWindow::new(day(3), day(3), 10);
        let events = engine.query(&ProductId::new("p-1"), &window).await;

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.product_id.as_str() == "p-1"));
    }

    #[tokio::test]
    async fn overlong_window_scans_at_most_max_days() {
        let store = InMemoryEventStore::new();
        let engine = TimelineQueryEngine::with_config(
            store.clone(),
            TimelineConfig {
                max_days: 30,
                ..TimelineConfig::default()
            },
        );

        let events = engine
            .get_timeline(
                &ProductId::new("p-1"),
                NaiveDate::from_ymd_opt(1, 1, 1),
                Some(day(30)),
                Some(1),
            )
            .await;

        assert!(events.is_empty());
        let reads = store.partition_reads().await;
        assert_eq!(reads.len(), 30);
        assert_eq!(reads[0].0.event_date, day(30));
        assert_eq!(reads[29].0.event_date, day(1));
    }

    #[tokio::test]
    async fn defaults_apply_when_arguments_are_missing() {
        let store = InMemoryEventStore::new();
        let engine = TimelineQueryEngine::with_config(
            store.clone(),
            TimelineConfig {
                default_days: 3,
                ..TimelineConfig::default()
            },
        );

        let events = engine
            .get_timeline(&ProductId::new("p-1"), None, None, None)
            .await;

        assert!(events.is_empty());
        let reads = store.partition_reads().await;
        assert_eq!(reads.len(), 3);
        assert!(reads.iter().all(|(_, limit)| *limit == 100));
    }
}
