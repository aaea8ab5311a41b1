use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Category;

/// Discount attached to a product
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
pub struct Discount {
    pub active: bool,

    #[validate(range(min = 0.0, message = "Discounted price cannot be negative"))]
    pub discounted_price: f64,
}

/// Catalog product
///
/// `category` is only populated on search results, where the category is
/// joined at query time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub images: Vec<String>,
    pub discount: Discount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}
