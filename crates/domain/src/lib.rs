pub mod commands;
pub mod errors;
pub mod events;
pub mod models;

pub use errors::DomainError;
pub use models::{BasketEntry, Category, Discount, Order, Product, Review};

/// Generate a new opaque entity identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
