use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DomainEvent;
use crate::errors::DomainError;

/// Published when a user confirms the purchase of a product sitting in their basket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct OrderCreatedEvent {
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub product_id: String,
}

impl DomainEvent for OrderCreatedEvent {
    fn event_type() -> &'static str {
        "OrderCreated"
    }

    fn decode(payload: &[u8]) -> Result<Self, DomainError> {
        let event: Self = serde_json::from_slice(payload)?;
        event.validate()?;
        Ok(event)
    }
}
