use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Event, EventId, EventKind, PartitionKey, ProductId, Result,
    store::{EventStore, validate_event},
};

/// PostgreSQL-backed event store.
///
/// The `user_events` table is keyed by `(product_id, event_date, event_time,
/// event_id)`, so each partition read is a single backward index range scan.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url` and runs the migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.run_migrations().await?;
        info!(max_connections, "Event log ready");
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_event(row: PgRow) -> Result<Event> {
        let props_json: serde_json::Value = row.try_get("event_props")?;
        let props: BTreeMap<String, String> = serde_json::from_value(props_json)?;
        let kind: String = row.try_get("event_type")?;

        Ok(Event {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            event_date: row.try_get("event_date")?,
            event_time: row.try_get("event_time")?,
            user_id: row.try_get("user_id")?,
            session_id: row.try_get("session_id")?,
            kind: EventKind::from(kind),
            props,
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert_event(&self, event: Event) -> Result<()> {
        validate_event(&event)?;

        let props_json = serde_json::to_value(&event.props)?;

        sqlx::query(
            r#"
            INSERT INTO user_events (event_id, product_id, event_date, event_time, user_id, session_id, event_type, event_props)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.event_id.as_uuid())
        .bind(event.product_id.as_str())
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(&event.user_id)
        .bind(&event.session_id)
        .bind(event.kind.as_str())
        .bind(props_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_by_partition(&self, key: &PartitionKey, limit: usize) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, product_id, event_date, event_time, user_id, session_id, event_type, event_props
            FROM user_events
            WHERE product_id = $1 AND event_date = $2
            ORDER BY event_time DESC, event_id DESC
            LIMIT $3
            "#,
        )
        .bind(key.product_id.as_str())
        .bind(key.event_date)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        debug!(partition = %key, rows = rows.len(), "Partition read");
        rows.into_iter().map(Self::row_to_event).collect()
    }
}
