use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Review;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub product_id: String,

    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[serde(default)]
    pub comment: String,
}

/// Update of a review. Only matches when id, user and product all agree.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1, message = "Review id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub product_id: String,

    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteReviewRequest {
    #[validate(length(min = 1, message = "Review id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "Product id cannot be empty"))]
    pub product_id: String,
}

/// Review listing. `search_by` matches either the product id or the user id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ListReviewsRequest {
    pub search_by: Option<String>,
    pub offset: i64,
    pub limit: i64,

    #[validate(range(min = -1, max = 1, message = "Sort order must be -1, 0 or 1"))]
    pub sort_by: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}
