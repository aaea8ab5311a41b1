//! Catalog and basket persistence.
//!
//! Catalog data (products, categories, reviews, orders) lives in a document
//! store; baskets live in a key-value list store. Both are reached through
//! traits so the MongoDB/Redis adapters and the in-memory ones are
//! interchangeable. [`StorageImpl`] composes the repositories over a pair of
//! store handles.

pub mod context;
pub mod document;
pub mod error;
pub mod facade;
pub mod kv;
pub mod pagination;
pub mod pipeline;
pub mod repositories;
pub mod timestamp;

pub use context::{cancellation, CallContext, CancelHandle, Cancellation};
pub use error::{Result, StorageError, StoreError};
pub use facade::{Storage, StorageImpl};
pub use repositories::{
    BasketRepository, CategoryRepository, OrderRepository, ProductRepository, ReviewRepository,
};
