//! Key-value list storage backing per-user baskets.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryListStore;
pub use redis_store::RedisListStore;

/// List-valued keys. Values are opaque strings; callers own the encoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append to the tail of the list, creating it if absent
    async fn push(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Whole list, head first. Absent keys read as empty.
    async fn range(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Atomically remove occurrences of `value`: the first `count` from the
    /// head when positive, from the tail when negative, all when zero.
    /// Returns how many were removed.
    async fn remove_value(&self, key: &str, value: &str, count: i64) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
