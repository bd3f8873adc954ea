//! Fire-and-forget event-log writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use event_store::{Event, EventStore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Submits events to the log on detached tasks.
///
/// `record` returns immediately; a failed write is logged and counted but
/// never reported to the caller. Finished tasks are reaped on every submit,
/// and [`drain`](Self::drain) waits for the ones still in flight.
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Queues a write of `event`. Must be called inside a Tokio runtime.
    pub fn record(&self, event: Event) {
        let store = Arc::clone(&self.store);

        let mut tasks = self.lock_tasks();
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            let partition = event.partition_key();
            let kind = event.kind.clone();
            match store.insert_event(event).await {
                Ok(()) => {
                    metrics::counter!("event_log_writes_total").increment(1);
                    debug!(partition = %partition, kind = %kind, "Event written");
                }
                Err(error) => {
                    metrics::counter!("event_log_write_failures_total").increment(1);
                    warn!(partition = %partition, kind = %kind, error = %error, "Event write dropped");
                }
            }
        });
    }

    /// Number of writes still in flight.
    pub fn pending(&self) -> usize {
        let mut tasks = self.lock_tasks();
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Waits until every queued write has finished, including writes queued
    /// while draining.
    pub async fn drain(&self) {
        loop {
            let mut batch = std::mem::take(&mut *self.lock_tasks());
            if batch.is_empty() {
                return;
            }
            while batch.join_next().await.is_some() {}
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
