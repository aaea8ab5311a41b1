pub mod basket_repository;
pub mod category_repository;
pub mod order_repository;
pub mod product_repository;
pub mod review_repository;

pub use basket_repository::{BasketRepository, ListBasketRepository};
pub use category_repository::{CategoryRepository, DocumentCategoryRepository};
pub use order_repository::{DocumentOrderRepository, OrderRepository};
pub use product_repository::{DocumentProductRepository, ProductRepository};
pub use review_repository::{DocumentReviewRepository, ReviewRepository};

use mongodb::bson::{self, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, StorageError};

pub(crate) fn to_document<T: Serialize>(operation: &'static str, value: &T) -> Result<Document> {
    bson::to_document(value).map_err(|e| StorageError::decode(operation, e))
}

pub(crate) fn from_document<T: DeserializeOwned>(operation: &'static str, document: Document) -> Result<T> {
    bson::from_document(document).map_err(|e| StorageError::decode(operation, e))
}

/// Reject blank identifiers before they reach a store
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
