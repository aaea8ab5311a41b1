use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::BasketEntry;

/// Command to put a product into a user's basket
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddToBasketRequest {
    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub product_id: String,

    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    /// Stamped with the current time when absent
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

impl AddToBasketRequest {
    pub fn into_entry(self, now: DateTime<Utc>) -> BasketEntry {
        BasketEntry {
            product_id: self.product_id,
            user_id: self.user_id,
            purchase_date: self.purchase_date.unwrap_or(now),
            quantity: self.quantity,
            price: self.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddToBasketResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketResponse {
    pub user_id: String,
    pub entries: Vec<BasketEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_purchase_date_is_stamped() {
        let req = AddToBasketRequest {
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            purchase_date: None,
            quantity: 2,
            price: 9.99,
        };
        let now = Utc::now();
        let entry = req.into_entry(now);
        assert_eq!(entry.purchase_date, now);
        assert_eq!(entry.product_id, "p1");
    }

    #[test]
    fn test_zero_quantity_fails_validation() {
        let req = AddToBasketRequest {
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            purchase_date: None,
            quantity: 0,
            price: 9.99,
        };
        assert!(req.validate().is_err());
    }
}
