//! Order service: persist, then fan purchase events out.

use catalog::{CatalogStore, NewOrder, OrderId};
use event_store::{Event, EventKind};
use tracing::info;

use crate::product::UNKNOWN_SESSION;
use crate::{EventRecorder, Result};

/// Service for placing orders.
///
/// The order is written as one catalog document; each line item then
/// produces a `purchase` event. Event writes are detached, so a failed item
/// never un-places the order.
pub struct OrderService<C> {
    catalog: C,
    recorder: EventRecorder,
}

impl<C: CatalogStore> OrderService<C> {
    /// Creates a new order service.
    pub fn new(catalog: C, recorder: EventRecorder) -> Self {
        Self { catalog, recorder }
    }

    /// Returns a reference to the catalog store.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Persists `order` and returns its id.
    #[tracing::instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn place_order(&self, order: NewOrder) -> Result<OrderId> {
        let user_id = order.user_id.clone();
        let session_id = order
            .session_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SESSION.to_string());
        let lines = order.items.clone();

        let order_id = self.catalog.insert_order(order).await?;
        metrics::counter!("orders_placed_total").increment(1);

        for line in lines {
            let event = Event::now(
                line.product_id,
                EventKind::Purchase,
                user_id.clone(),
                session_id.clone(),
            )
            .with_prop("order_id", &order_id)
            .with_prop("qty", line.qty);
            self.recorder.record(event);
        }

        info!(order_id = %order_id, "Order placed");
        Ok(order_id)
    }
}
