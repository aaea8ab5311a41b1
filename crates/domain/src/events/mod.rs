pub mod order_events;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::DomainError;

/// Trait for all domain events
pub trait DomainEvent: Serialize + DeserializeOwned {
    /// Get the event type name
    fn event_type() -> &'static str;

    /// Decode an event from a raw queue payload
    fn decode(payload: &[u8]) -> Result<Self, DomainError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
