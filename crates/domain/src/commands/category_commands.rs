use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Category;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Category name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateCategoryResponse {
    pub status: bool,
    pub message: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, message = "Category id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "Category name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListCategoriesRequest {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPage {
    pub categories: Vec<Category>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}
