use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{Event, EventKind, EventStore, InMemoryEventStore, PartitionKey, ProductId};

fn make_event(product: &str, offset_secs: i64) -> Event {
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    Event::builder()
        .product_id(product)
        .kind(EventKind::View)
        .event_time(base + Duration::seconds(offset_secs))
        .user_id("bench-user")
        .session_id("bench-session")
        .prop("source", "bench")
        .build()
}

fn bench_insert_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/insert_single_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                store.insert_event(make_event("p-1", 0)).await.unwrap();
            });
        });
    });
}

fn bench_insert_into_busy_partition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();

    rt.block_on(async {
        for offset in 0..1000 {
            store.insert_event(make_event("p-1", offset * 60)).await.unwrap();
        }
    });

    c.bench_function("event_store/insert_into_1000_event_partition", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.insert_event(make_event("p-1", 43_000)).await.unwrap();
            });
        });
    });
}

fn bench_select_partition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();

    rt.block_on(async {
        for offset in 0..1000 {
            store.insert_event(make_event("p-1", offset * 60)).await.unwrap();
        }
    });

    let key = PartitionKey::new(
        ProductId::new("p-1"),
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
            .unwrap()
            .date_naive(),
    );

    c.bench_function("event_store/select_partition_limit_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.select_by_partition(&key, 100).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_insert_single_event,
    bench_insert_into_busy_partition,
    bench_select_partition,
);
criterion_main!(benches);
