pub mod consumer;

pub use consumer::{ConsumerError, EventConsumer};
