use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Message has no payload")]
    NoPayload,
}

/// Kafka consumer delivering raw event payloads from a single topic
pub struct EventConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl EventConsumer {
    /// Create a new Kafka consumer subscribed to `topic`
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, ConsumerError> {
        info!(
            group_id = %group_id,
            topic = %topic,
            "Creating Kafka consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", group_id)
            .set("bootstrap.servers", brokers)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "10000")
            .create()?;

        consumer.subscribe(&[topic])?;

        info!(topic = %topic, "Kafka consumer created successfully");
        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next message and return its payload bytes
    pub async fn recv(&self) -> Result<Vec<u8>, ConsumerError> {
        let message = self.consumer.recv().await?;

        debug!(
            topic = %message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "Received message"
        );

        match message.payload() {
            Some(payload) => Ok(payload.to_vec()),
            None => {
                warn!(offset = message.offset(), "Message has no payload");
                Err(ConsumerError::NoPayload)
            }
        }
    }
}
