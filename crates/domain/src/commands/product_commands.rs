use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Discount, Product};

/// Command to create a new product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub category_id: String,

    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub discount: Discount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateProductResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
}

/// Command to update a live product. Images are appended, everything else is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub discount: Discount,
}

/// Search parameters for the product listing.
///
/// Sort orders are `1` (ascending), `-1` (descending) or `0` (unused).
/// `page` and `limit` of `0` fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub discount_only: bool,
    pub newest_first: bool,

    #[validate(range(min = -1, max = 1, message = "Price order must be -1, 0 or 1"))]
    pub price_order: i32,

    #[validate(range(min = -1, max = 1, message = "Rating order must be -1, 0 or 1"))]
    pub rating_order: i32,

    #[validate(range(min = -1, max = 1, message = "Comment order must be -1, 0 or 1"))]
    pub comment_order: i32,

    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product_request_validation() {
        let req = CreateProductRequest {
            category_id: "c1".to_string(),
            name: "Phone".to_string(),
            description: String::new(),
            price: 10.0,
            stock: 1,
            images: vec![],
            discount: Discount::default(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_product_negative_stock_fails() {
        let req = CreateProductRequest {
            category_id: "c1".to_string(),
            name: "Phone".to_string(),
            description: String::new(),
            price: 10.0,
            stock: -1,
            images: vec![],
            discount: Discount::default(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_product_negative_discount_fails() {
        let req = CreateProductRequest {
            category_id: "c1".to_string(),
            name: "Phone".to_string(),
            description: String::new(),
            price: 10.0,
            stock: 1,
            images: vec![],
            discount: Discount {
                active: true,
                discounted_price: -5.0,
            },
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_filter_rejects_out_of_range_sort_order() {
        let filter = ProductFilter {
            price_order: 2,
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_filter_deserializes_sparse_input() {
        let filter: ProductFilter = serde_json::from_str(r#"{"name": "phone", "page": 2}"#).unwrap();
        assert_eq!(filter.name.as_deref(), Some("phone"));
        assert_eq!(filter.page, 2);
        assert_eq!(filter.limit, 0);
        assert!(!filter.discount_only);
    }
}
