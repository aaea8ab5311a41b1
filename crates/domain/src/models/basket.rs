use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Order;

/// Pending purchase held in a user's basket until an order event confirms it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketEntry {
    pub product_id: String,
    pub user_id: String,
    pub purchase_date: DateTime<Utc>,
    pub quantity: i64,
    pub price: f64,
}

impl From<BasketEntry> for Order {
    fn from(entry: BasketEntry) -> Self {
        Order {
            id: entry.product_id,
            user_id: entry.user_id,
            purchase_date: entry.purchase_date,
            quantity: entry.quantity,
            price: entry.price,
        }
    }
}
