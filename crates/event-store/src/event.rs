use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProductId;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened. Stored as a lowercase string so new kinds can be
/// written without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    View,
    Purchase,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::View => "view",
            EventKind::Purchase => "purchase",
            EventKind::Other(kind) => kind,
        }
    }
}

impl From<String> for EventKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "view" => EventKind::View,
            "purchase" => EventKind::Purchase,
            _ => EventKind::Other(kind),
        }
    }
}

impl From<&str> for EventKind {
    fn from(kind: &str) -> Self {
        EventKind::from(kind.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical location of an event: one product on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub product_id: ProductId,
    pub event_date: NaiveDate,
}

impl PartitionKey {
    pub fn new(product_id: ProductId, event_date: NaiveDate) -> Self {
        Self {
            product_id,
            event_date,
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.product_id, self.event_date)
    }
}

/// An immutable behavioral fact recorded against a product.
///
/// Events live in the partition named by `(product_id, event_date)` and are
/// clustered newest-first by `event_time` inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub product_id: ProductId,
    pub event_date: NaiveDate,
    pub event_time: DateTime<Utc>,
    pub user_id: String,
    pub session_id: String,
    pub kind: EventKind,
    pub props: BTreeMap<String, String>,
}

impl Event {
    /// Creates an event stamped with the current time.
    pub fn now(
        product_id: ProductId,
        kind: EventKind,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let event_time = Utc::now();
        Self {
            event_id: EventId::new(),
            product_id,
            event_date: event_time.date_naive(),
            event_time,
            user_id: user_id.into(),
            session_id: session_id.into(),
            kind,
            props: BTreeMap::new(),
        }
    }

    /// Adds a property, stringifying the value.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.props.insert(key.into(), value.to_string());
        self
    }

    /// Returns the partition this event belongs to.
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::new(self.product_id.clone(), self.event_date)
    }

    /// Creates a new event builder.
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }
}

/// Builder for constructing events with explicit timestamps.
#[derive(Debug, Default)]
pub struct EventBuilder {
    event_id: Option<EventId>,
    product_id: Option<ProductId>,
    event_time: Option<DateTime<Utc>>,
    user_id: Option<String>,
    session_id: Option<String>,
    kind: Option<EventKind>,
    props: BTreeMap<String, String>,
}

impl EventBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn product_id(mut self, id: impl Into<ProductId>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    /// Sets the timestamp. The partition day is derived from it.
    /// If not set, the current time will be used.
    pub fn event_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<EventKind>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Adds a property entry.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Builds the event.
    ///
    /// # Panics
    ///
    /// Panics if `product_id` or `kind` is not set.
    pub fn build(self) -> Event {
        self.try_build().expect("product_id and kind are required")
    }

    /// Tries to build the event, returning None if required fields are missing.
    pub fn try_build(self) -> Option<Event> {
        let event_time = self.event_time.unwrap_or_else(Utc::now);
        Some(Event {
            event_id: self.event_id.unwrap_or_default(),
            product_id: self.product_id?,
            event_date: event_time.date_naive(),
            event_time,
            user_id: self.user_id.unwrap_or_default(),
            session_id: self.session_id.unwrap_or_default(),
            kind: self.kind?,
            props: self.props,
        })
    }
}
