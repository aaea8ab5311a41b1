//! Store-agnostic document access.
//!
//! Repositories describe what they want with [`Filter`], [`Update`] and
//! [`Stage`] values; adapters decide how to run them. The MongoDB adapter
//! translates them to BSON commands, the in-memory adapter evaluates them
//! directly.

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::error::StoreError;
use crate::timestamp;

pub use memory::MemoryDocumentStore;
pub use mongo::MongoDocumentStore;

pub const PRODUCTS: &str = "product";
pub const CATEGORIES: &str = "categories";
pub const REVIEWS: &str = "comments";
pub const ORDERS: &str = "bought_products";

/// Predicate over documents. Field names may use dotted paths into
/// embedded documents (`category.name`).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Bson),
    /// Case-insensitive substring match on a string field
    Contains { field: String, needle: String },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn id(id: &str) -> Self {
        Filter::eq("_id", id)
    }

    /// Soft-delete guard: only records whose `deleted_at` is empty
    pub fn live() -> Self {
        Filter::eq("deleted_at", timestamp::LIVE)
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Filter::Contains {
            field: field.to_string(),
            needle: needle.to_string(),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::All => other,
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            filter => Filter::And(vec![filter, other]),
        }
    }
}

/// Write applied by a conditional update: `$set` the given fields and
/// append each value of the `$push` lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub set: Document,
    pub push: Vec<(String, Vec<Bson>)>,
}

impl Update {
    pub fn set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.set.insert(field, value.into());
        self
    }

    pub fn push_all(mut self, field: &str, values: Vec<Bson>) -> Self {
        if !values.is_empty() {
            self.push.push((field.to_string(), values));
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `1` ascending, `-1` descending, anything else unused
    pub fn from_direction(direction: i32) -> Option<Self> {
        match direction {
            1 => Some(SortOrder::Ascending),
            -1 => Some(SortOrder::Descending),
            _ => None,
        }
    }

    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

pub type SortKey = (String, SortOrder);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// How the rows matched by a [`Stage::Join`] collapse into the alias field.
/// Every fold keeps exactly one output document per input document.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinFold {
    /// First matching document, or the field is absent when none match
    First,
    /// Number of matching documents
    Count,
    /// Mean of a numeric field over the matches, `0` when none match
    Average { field: String },
}

/// One aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Join {
        from: String,
        local_field: String,
        foreign_field: String,
        alias: String,
        fold: JoinFold,
        /// Only join foreign documents that are not soft-deleted
        only_live: bool,
    },
    Sort(Vec<SortKey>),
    /// Replace the stream with a single `{alias: n}` document (nothing when empty)
    Count { alias: String },
    Skip(u64),
    Limit(u64),
}

#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn insert_one(&self, document: Document) -> Result<(), StoreError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;

    /// Atomically update the first match and return it as it is after the update
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, StoreError>;

    /// Atomically update the first match, returning how many documents changed
    async fn update_one(&self, filter: &Filter, update: &Update) -> Result<u64, StoreError>;

    async fn aggregate(&self, pipeline: &[Stage]) -> Result<Vec<Document>, StoreError>;
}

/// A named database exposing its collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read an integer that the store may have encoded as any numeric type
pub fn bson_as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_flattens() {
        let filter = Filter::id("p1").and(Filter::live()).and(Filter::eq("user_id", "u1"));
        match filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_and_on_all_is_identity() {
        assert_eq!(Filter::All.and(Filter::live()), Filter::live());
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortOrder::from_direction(-1), Some(SortOrder::Descending));
        assert_eq!(SortOrder::from_direction(0), None);
        assert_eq!(SortOrder::Ascending.direction(), 1);
    }

    #[test]
    fn test_empty_push_is_dropped() {
        let update = Update::default().push_all("images", vec![]);
        assert!(update.push.is_empty());
    }

    #[test]
    fn test_count_value_any_width() {
        assert_eq!(bson_as_i64(&Bson::Int32(3)), Some(3));
        assert_eq!(bson_as_i64(&Bson::Int64(3)), Some(3));
        assert_eq!(bson_as_i64(&Bson::String("3".into())), None);
    }
}
