use thiserror::Error;

use crate::PartitionKey;

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The event violates a partitioning invariant and was not written.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// The partition could not be reached.
    #[error("Partition {partition} unavailable: {reason}")]
    Unavailable {
        partition: PartitionKey,
        reason: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
