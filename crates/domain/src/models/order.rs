use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Confirmed purchase. Immutable once written.
///
/// The id mirrors the product id of the basket entry the order was made from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Order {
    #[validate(length(min = 1, message = "Order id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    pub purchase_date: DateTime<Utc>,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

impl Order {
    pub fn total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_validation() {
        let order = Order {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            purchase_date: Utc::now(),
            quantity: 2,
            price: 9.99,
        };
        assert!(order.validate().is_ok());
        assert!((order.total() - 19.98).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_zero_quantity_fails() {
        let order = Order {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            purchase_date: Utc::now(),
            quantity: 0,
            price: 9.99,
        };
        assert!(order.validate().is_err());
    }
}
