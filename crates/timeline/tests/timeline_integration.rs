//! End-to-end timeline behavior against the in-memory event store.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use common::ProductId;
use event_store::{Event, EventKind, EventStore, InMemoryEventStore, PartitionKey};
use timeline::{TimelineQueryEngine, TimelineWindow};

const PRODUCT: &str = "sku-42";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
}

fn event_at(time: DateTime<Utc>) -> Event {
    Event::builder()
        .product_id(PRODUCT)
        .kind(EventKind::View)
        .event_time(time)
        .user_id("user-1")
        .session_id("session-1")
        .build()
}

/// Inserts `count` events spread over the given day.
async fn fill_day(store: &InMemoryEventStore, d: u32, count: u32) -> Vec<Event> {
    let base = Utc.with_ymd_and_hms(2024, 7, d, 8, 0, 0).unwrap();
    let mut inserted = Vec::new();
    for i in 0..count {
        let event = event_at(base + Duration::minutes(i64::from(i) * 7));
        store.insert_event(event.clone()).await.unwrap();
        inserted.push(event);
    }
    inserted
}

fn product() -> ProductId {
    ProductId::new(PRODUCT)
}

fn assert_newest_first(events: &[Event]) {
    assert!(
        events.windows(2).all(|w| w[0].event_time >= w[1].event_time),
        "timeline is not sorted newest first"
    );
}

#[tokio::test]
async fn budget_shrinks_across_partitions() {
    // Newest day has 2 events, the day before none, the one before that 5.
    let store = InMemoryEventStore::new();
    fill_day(&store, 12, 2).await;
    let older = fill_day(&store, 10, 5).await;

    let engine = TimelineQueryEngine::new(store.clone());
    let window = TimelineWindow::new(day(10), day(12), 4);
    let events = engine.query(&product(), &window).await;

    assert_eq!(events.len(), 4);
    assert_newest_first(&events);
    assert!(events[..2].iter().all(|e| e.event_date == day(12)));

    // The two newest events of the older day fill the rest.
    let mut expected_older: Vec<_> = older.iter().rev().take(2).cloned().collect();
    expected_older.sort_by(|a, b| b.event_time.cmp(&a.event_time));
    assert_eq!(&events[2..], &expected_older[..]);

    let reads = store.partition_reads().await;
    let requested: Vec<_> = reads
        .iter()
        .map(|(key, limit)| (key.event_date, *limit))
        .collect();
    assert_eq!(requested, vec![(day(12), 4), (day(11), 2), (day(10), 2)]);
}

#[tokio::test]
async fn result_never_exceeds_limit() {
    let store = InMemoryEventStore::new();
    for d in 1..=5 {
        fill_day(&store, d, 3).await;
    }
    let engine = TimelineQueryEngine::new(store);

    for limit in 1..=20 {
        let window = TimelineWindow::new(day(1), day(5), limit);
        let events = engine.query(&product(), &window).await;
        assert!(events.len() <= limit, "limit {limit} returned {}", events.len());
        assert_eq!(events.len(), limit.min(15));
        assert_newest_first(&events);
    }
}

#[tokio::test]
async fn overfull_window_returns_the_most_recent_events() {
    let store = InMemoryEventStore::new();
    let mut all = Vec::new();
    for d in 1..=4 {
        all.extend(fill_day(&store, d, 4).await);
    }
    all.sort_by(|a, b| b.event_time.cmp(&a.event_time));

    let engine = TimelineQueryEngine::new(store);
    let window = TimelineWindow::new(day(1), day(4), 6);
    let events = engine.query(&product(), &window).await;

    assert_eq!(events, all[..6].to_vec());
}

#[tokio::test]
async fn swapped_dates_give_identical_results() {
    let store = InMemoryEventStore::new();
    for d in 3..=6 {
        fill_day(&store, d, 2).await;
    }
    let engine = TimelineQueryEngine::new(store);

    let forward = engine
        .get_timeline(&product(), Some(day(3)), Some(day(6)), Some(5))
        .await;
    let backward = engine
        .get_timeline(&product(), Some(day(6)), Some(day(3)), Some(5))
        .await;

    assert_eq!(forward.len(), 5);
    assert_eq!(forward, backward);
}

#[tokio::test]
async fn failing_partition_matches_timeline_without_that_day() {
    let degraded = InMemoryEventStore::new();
    let reference = InMemoryEventStore::new();
    for d in 1..=3 {
        let events = fill_day(&degraded, d, 3).await;
        if d != 2 {
            for event in events {
                reference.insert_event(event).await.unwrap();
            }
        }
    }
    degraded
        .fail_partition(PartitionKey::new(product(), day(2)))
        .await;

    let window = TimelineWindow::new(day(1), day(3), 50);
    let with_failure = TimelineQueryEngine::new(degraded)
        .query(&product(), &window)
        .await;
    let without_day = TimelineQueryEngine::new(reference)
        .query(&product(), &window)
        .await;

    assert_eq!(with_failure.len(), 6);
    assert_eq!(with_failure, without_day);
}

#[tokio::test]
async fn single_day_range_reads_one_partition() {
    let store = InMemoryEventStore::new();
    fill_day(&store, 9, 3).await;

    let engine = TimelineQueryEngine::new(store.clone());
    let events = engine
        .get_timeline(&product(), Some(day(9)), Some(day(9)), Some(10))
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(store.partition_reads().await.len(), 1);
}

#[tokio::test]
async fn zero_limit_is_treated_as_one() {
    let store = InMemoryEventStore::new();
    let inserted = fill_day(&store, 20, 3).await;

    let engine = TimelineQueryEngine::new(store);
    let events = engine
        .get_timeline(&product(), Some(day(20)), Some(day(20)), Some(0))
        .await;

    assert_eq!(events, vec![inserted[2].clone()]);
}

#[tokio::test]
async fn window_outside_retention_is_empty() {
    let store = InMemoryEventStore::new();
    fill_day(&store, 15, 3).await;

    let engine = TimelineQueryEngine::new(store);
    let events = engine
        .get_timeline(&product(), Some(day(1)), Some(day(7)), Some(10))
        .await;

    assert!(events.is_empty());
}
