use std::sync::Arc;
use std::time::Duration;

use messaging::{ConsumerError, EventConsumer};
use tracing::{error, info, warn};

use crate::fulfillment::OrderFulfillment;

const BROKER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Feeds order-created messages to the fulfillment workflow
pub struct OrderEventConsumer {
    consumer: EventConsumer,
    fulfillment: Arc<OrderFulfillment>,
}

/// How long to wait before the next receive. An empty message says nothing
/// about the broker, so only broker failures back off.
fn retry_delay(err: &ConsumerError) -> Option<Duration> {
    match err {
        ConsumerError::Kafka(_) => Some(BROKER_RETRY_DELAY),
        ConsumerError::NoPayload => None,
    }
}

impl OrderEventConsumer {
    pub fn new(consumer: EventConsumer, fulfillment: Arc<OrderFulfillment>) -> Self {
        Self {
            consumer,
            fulfillment,
        }
    }

    /// Start consuming. Each message is handled on its own task so a slow
    /// store call never stalls the next receive.
    pub async fn run(self) {
        info!(topic = %self.consumer.topic(), "Order event consumer started");

        loop {
            match self.consumer.recv().await {
                Ok(payload) => {
                    let fulfillment = self.fulfillment.clone();
                    tokio::spawn(async move {
                        fulfillment.handle_order_created(&payload).await;
                    });
                }
                Err(e) => match retry_delay(&e) {
                    Some(delay) => {
                        error!("Error receiving order event: {}", e);
                        tokio::time::sleep(delay).await;
                    }
                    None => warn!(error = %e, "Skipping order event"),
                },
            }
        }
    }
}
