pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::ProductId;
pub use error::{EventStoreError, Result};
pub use event::{Event, EventBuilder, EventId, EventKind, PartitionKey};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{EventStore, validate_event};
