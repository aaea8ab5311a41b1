use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use tracing::info;

use super::{
    DocumentCollection, DocumentStore, Filter, FindOptions, JoinFold, SortKey, Stage, Update,
};
use crate::error::StoreError;
use crate::timestamp;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed document store. The driver pools connections internally,
/// so one handle is shared by every repository for the life of the process.
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// Connect and verify the server answers a ping
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }, None).await?;

        info!(database = %database, "MongoDB connection established");
        Ok(Self { db })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(MongoCollection {
            coll: self.db.collection::<Document>(name),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

struct MongoCollection {
    coll: Collection<Document>,
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        let id = document.get_str("_id").unwrap_or_default().to_string();
        match self.coll.insert_one(document, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateKey(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        Ok(self.coll.find_one(filter_document(filter), None).await?)
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let mut find_options = mongodb::options::FindOptions::default();
        if !options.sort.is_empty() {
            find_options.sort = Some(sort_document(&options.sort));
        }
        if options.skip > 0 {
            find_options.skip = Some(options.skip);
        }
        find_options.limit = options.limit.map(|limit| limit as i64);

        let cursor = self.coll.find(filter_document(filter), find_options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self.coll.count_documents(filter_document(filter), None).await?)
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, StoreError> {
        let mut options = FindOneAndUpdateOptions::default();
        options.return_document = Some(ReturnDocument::After);

        Ok(self
            .coll
            .find_one_and_update(filter_document(filter), update_document(update), options)
            .await?)
    }

    async fn update_one(&self, filter: &Filter, update: &Update) -> Result<u64, StoreError> {
        let result = self
            .coll
            .update_one(filter_document(filter), update_document(update), None)
            .await?;
        Ok(result.modified_count)
    }

    async fn aggregate(&self, pipeline: &[Stage]) -> Result<Vec<Document>, StoreError> {
        let cursor = self.coll.aggregate(pipeline_documents(pipeline), None).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

pub fn filter_document(filter: &Filter) -> Document {
    match filter {
        Filter::All => Document::new(),
        Filter::Eq(field, value) => {
            let mut document = Document::new();
            document.insert(field.as_str(), value.clone());
            document
        }
        Filter::Contains { field, needle } => {
            let mut document = Document::new();
            document.insert(
                field.as_str(),
                doc! { "$regex": escape_regex(needle), "$options": "i" },
            );
            document
        }
        Filter::And(filters) if filters.is_empty() => Document::new(),
        Filter::And(filters) => doc! { "$and": filter_array(filters) },
        Filter::Or(filters) => doc! { "$or": filter_array(filters) },
    }
}

fn filter_array(filters: &[Filter]) -> Vec<Bson> {
    filters
        .iter()
        .map(|f| Bson::Document(filter_document(f)))
        .collect()
}

pub fn update_document(update: &Update) -> Document {
    let mut document = Document::new();
    if !update.set.is_empty() {
        document.insert("$set", update.set.clone());
    }
    if !update.push.is_empty() {
        let mut push = Document::new();
        for (field, values) in &update.push {
            push.insert(field.as_str(), doc! { "$each": values.clone() });
        }
        document.insert("$push", push);
    }
    document
}

fn sort_document(keys: &[SortKey]) -> Document {
    let mut document = Document::new();
    for (field, order) in keys {
        document.insert(field.as_str(), order.direction());
    }
    document
}

/// Translate stages into an aggregation pipeline. A join expands to a
/// `$lookup` followed by an `$addFields` that folds the joined array.
pub fn pipeline_documents(stages: &[Stage]) -> Vec<Document> {
    let mut pipeline = Vec::with_capacity(stages.len());

    for stage in stages {
        match stage {
            Stage::Match(filter) => pipeline.push(doc! { "$match": filter_document(filter) }),
            Stage::Join {
                from,
                local_field,
                foreign_field,
                alias,
                fold,
                only_live,
            } => {
                let lookup = if *only_live {
                    doc! {
                        "from": from.as_str(),
                        "let": { "join_key": format!("${}", local_field) },
                        "pipeline": [
                            { "$match": {
                                "$expr": { "$eq": [format!("${}", foreign_field), "$$join_key"] },
                                "deleted_at": timestamp::LIVE,
                            } }
                        ],
                        "as": alias.as_str(),
                    }
                } else {
                    doc! {
                        "from": from.as_str(),
                        "localField": local_field.as_str(),
                        "foreignField": foreign_field.as_str(),
                        "as": alias.as_str(),
                    }
                };
                pipeline.push(doc! { "$lookup": lookup });

                let joined = format!("${}", alias);
                let folded = match fold {
                    JoinFold::First => Bson::Document(doc! { "$arrayElemAt": [joined, 0] }),
                    JoinFold::Count => Bson::Document(doc! { "$size": joined }),
                    JoinFold::Average { field } => Bson::Document(doc! {
                        "$ifNull": [ { "$avg": format!("{}.{}", joined, field) }, 0 ]
                    }),
                };
                let mut add_fields = Document::new();
                add_fields.insert(alias.as_str(), folded);
                pipeline.push(doc! { "$addFields": add_fields });
            }
            Stage::Sort(keys) => pipeline.push(doc! { "$sort": sort_document(keys) }),
            Stage::Count { alias } => pipeline.push(doc! { "$count": alias.as_str() }),
            Stage::Skip(n) => pipeline.push(doc! { "$skip": *n as i64 }),
            Stage::Limit(n) => pipeline.push(doc! { "$limit": *n as i64 }),
        }
    }

    pipeline
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SortOrder;

    #[test]
    fn test_live_filter_is_empty_string_equality() {
        let document = filter_document(&Filter::id("p1").and(Filter::live()));
        assert_eq!(
            document,
            doc! { "$and": [ { "_id": "p1" }, { "deleted_at": "" } ] }
        );
    }

    #[test]
    fn test_contains_is_case_insensitive_escaped_regex() {
        let document = filter_document(&Filter::contains("name", "a.b"));
        assert_eq!(
            document,
            doc! { "name": { "$regex": "a\\.b", "$options": "i" } }
        );
    }

    #[test]
    fn test_update_with_set_and_push() {
        let update = Update::default()
            .set("name", "Phone")
            .push_all("images", vec![Bson::String("a.png".into())]);
        assert_eq!(
            update_document(&update),
            doc! {
                "$set": { "name": "Phone" },
                "$push": { "images": { "$each": ["a.png"] } },
            }
        );
    }

    #[test]
    fn test_first_join_folds_with_array_elem_at() {
        let pipeline = pipeline_documents(&[Stage::Join {
            from: "categories".to_string(),
            local_field: "category_id".to_string(),
            foreign_field: "_id".to_string(),
            alias: "category".to_string(),
            fold: JoinFold::First,
            only_live: false,
        }]);

        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline[0],
            doc! { "$lookup": {
                "from": "categories",
                "localField": "category_id",
                "foreignField": "_id",
                "as": "category",
            } }
        );
        assert_eq!(
            pipeline[1],
            doc! { "$addFields": { "category": { "$arrayElemAt": ["$category", 0] } } }
        );
    }

    #[test]
    fn test_live_join_uses_lookup_pipeline() {
        let pipeline = pipeline_documents(&[Stage::Join {
            from: "comments".to_string(),
            local_field: "_id".to_string(),
            foreign_field: "product_id".to_string(),
            alias: "comment_count".to_string(),
            fold: JoinFold::Count,
            only_live: true,
        }]);

        let lookup = pipeline[0].get_document("$lookup").unwrap();
        assert!(lookup.contains_key("pipeline"));
        assert!(!lookup.contains_key("localField"));
        assert_eq!(
            pipeline[1],
            doc! { "$addFields": { "comment_count": { "$size": "$comment_count" } } }
        );
    }

    #[test]
    fn test_sort_keeps_key_order() {
        let pipeline = pipeline_documents(&[Stage::Sort(vec![
            ("created_at".to_string(), SortOrder::Descending),
            ("price".to_string(), SortOrder::Ascending),
        ])]);
        let sort = pipeline[0].get_document("$sort").unwrap();
        let keys: Vec<&String> = sort.keys().collect();
        assert_eq!(keys, vec!["created_at", "price"]);
    }

    #[test]
    fn test_pagination_stages() {
        let pipeline = pipeline_documents(&[Stage::Skip(20), Stage::Limit(10)]);
        assert_eq!(pipeline, vec![doc! { "$skip": 20_i64 }, doc! { "$limit": 10_i64 }]);
    }
}
