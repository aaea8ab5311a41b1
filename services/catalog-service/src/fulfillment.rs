use std::sync::Arc;
use std::time::Instant;

use common::metrics::record_event;
use domain::events::order_events::OrderCreatedEvent;
use domain::events::DomainEvent;
use domain::{DomainError, Order};
use storage::{CallContext, Storage, StorageError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Invalid order event: {0}")]
    Event(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Turns an order-created event into a confirmed order.
///
/// The basket entry for the event's product becomes the order, then that
/// entry is taken out of the basket. Nothing is reported back to the queue:
/// every failure is logged and the message is dropped.
pub struct OrderFulfillment {
    storage: Arc<dyn Storage>,
}

impl OrderFulfillment {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn handle_order_created(&self, payload: &[u8]) {
        let started = Instant::now();
        let result = self.fulfill(payload).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    quantity = order.quantity,
                    total = order.total(),
                    "Order fulfilled"
                );
                record_event(OrderCreatedEvent::event_type(), true, elapsed);
            }
            Err(e) => {
                error!(error = %e, "error in order fulfillment");
                record_event(OrderCreatedEvent::event_type(), false, elapsed);
            }
        }
    }

    async fn fulfill(&self, payload: &[u8]) -> Result<Order, FulfillmentError> {
        let event = OrderCreatedEvent::decode(payload)?;
        debug!(user_id = %event.user_id, product_id = %event.product_id, "Received order event");

        // No per-message deadline: a slow store holds this message until it answers
        let ctx = CallContext::background();

        let entry = self
            .storage
            .basket()
            .find_by_product_id(&ctx, &event.user_id, &event.product_id)
            .await?;

        let order = Order::from(entry);
        self.storage.orders().create(&ctx, order.clone()).await?;

        // The order stands even if the basket cannot be cleaned up
        match self
            .storage
            .basket()
            .consume(&ctx, &event.user_id, &event.product_id)
            .await
        {
            Ok(true) => debug!(product_id = %event.product_id, "Basket entry consumed"),
            Ok(false) => warn!(
                user_id = %event.user_id,
                product_id = %event.product_id,
                "Basket entry already gone after order was recorded"
            ),
            Err(e) => error!(
                user_id = %event.user_id,
                product_id = %event.product_id,
                error = %e,
                "Failed to remove fulfilled entry from basket"
            ),
        }

        Ok(order)
    }
}
