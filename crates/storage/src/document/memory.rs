use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::{
    DocumentCollection, DocumentStore, Filter, FindOptions, JoinFold, SortKey, SortOrder, Stage,
    Update,
};
use crate::error::StoreError;

type Collections = HashMap<String, Vec<Document>>;

/// Process-local document store used by tests and local runs.
/// Documents keep insertion order; `_id` is unique per collection.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(MemoryCollection {
            name: name.to_string(),
            data: self.data.clone(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct MemoryCollection {
    name: String,
    data: Arc<RwLock<Collections>>,
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let docs = data.entry(self.name.clone()).or_default();

        if let Some(id) = document.get("_id") {
            if docs.iter().any(|d| d.get("_id") == Some(id)) {
                return Err(StoreError::DuplicateKey(bson_display(id)));
            }
        }
        docs.push(document);
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .get(&self.name)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)).cloned()))
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let data = self.data.read().await;
        let mut found: Vec<Document> = data
            .get(&self.name)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default();

        sort_documents(&mut found, &options.sort);
        let found = found.into_iter().skip(options.skip as usize);
        Ok(match options.limit {
            Some(limit) => found.take(limit as usize).collect(),
            None => found.collect(),
        })
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .get(&self.name)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>, StoreError> {
        let mut data = self.data.write().await;
        let Some(docs) = data.get_mut(&self.name) else {
            return Ok(None);
        };

        Ok(docs.iter_mut().find(|d| matches(d, filter)).map(|doc| {
            apply_update(doc, update);
            doc.clone()
        }))
    }

    async fn update_one(&self, filter: &Filter, update: &Update) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let Some(docs) = data.get_mut(&self.name) else {
            return Ok(0);
        };

        match docs.iter_mut().find(|d| matches(d, filter)) {
            Some(doc) => {
                let before = doc.clone();
                apply_update(doc, update);
                Ok(u64::from(*doc != before))
            }
            None => Ok(0),
        }
    }

    async fn aggregate(&self, pipeline: &[Stage]) -> Result<Vec<Document>, StoreError> {
        let data = self.data.read().await;
        let mut docs = data.get(&self.name).cloned().unwrap_or_default();

        for stage in pipeline {
            docs = match stage {
                Stage::Match(filter) => docs.into_iter().filter(|d| matches(d, filter)).collect(),
                Stage::Join {
                    from,
                    local_field,
                    foreign_field,
                    alias,
                    fold,
                    only_live,
                } => {
                    let foreign: Vec<&Document> = data
                        .get(from)
                        .map(|f| {
                            f.iter()
                                .filter(|d| !*only_live || matches(d, &Filter::live()))
                                .collect()
                        })
                        .unwrap_or_default();

                    docs.into_iter()
                        .map(|mut doc| {
                            let local = get_path(&doc, local_field).cloned();
                            let joined: Vec<&Document> = foreign
                                .iter()
                                .copied()
                                .filter(|f| match (&local, get_path(f, foreign_field)) {
                                    (Some(l), Some(r)) => bson_eq(l, r),
                                    _ => false,
                                })
                                .collect();
                            fold_join(&mut doc, alias, fold, &joined);
                            doc
                        })
                        .collect()
                }
                Stage::Sort(keys) => {
                    sort_documents(&mut docs, keys);
                    docs
                }
                Stage::Count { alias } => {
                    if docs.is_empty() {
                        Vec::new()
                    } else {
                        let mut counted = Document::new();
                        counted.insert(alias.as_str(), docs.len() as i32);
                        vec![counted]
                    }
                }
                Stage::Skip(n) => docs.into_iter().skip(*n as usize).collect(),
                Stage::Limit(n) => docs.into_iter().take(*n as usize).collect(),
            };
        }

        Ok(docs)
    }
}

fn fold_join(doc: &mut Document, alias: &str, fold: &JoinFold, joined: &[&Document]) {
    match fold {
        JoinFold::First => match joined.first() {
            Some(first) => {
                doc.insert(alias, (*first).clone());
            }
            None => {
                doc.remove(alias);
            }
        },
        JoinFold::Count => {
            doc.insert(alias, joined.len() as i32);
        }
        JoinFold::Average { field } => {
            let values: Vec<f64> = joined
                .iter()
                .filter_map(|d| get_path(d, field).and_then(bson_as_f64))
                .collect();
            if values.is_empty() {
                doc.insert(alias, 0_i32);
            } else {
                doc.insert(alias, values.iter().sum::<f64>() / values.len() as f64);
            }
        }
    }
}

fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq(field, expected) => match get_path(doc, field) {
            Some(Bson::Array(items)) => items.iter().any(|item| bson_eq(item, expected)),
            Some(value) => bson_eq(value, expected),
            None => matches!(expected, Bson::Null),
        },
        Filter::Contains { field, needle } => match get_path(doc, field) {
            Some(Bson::String(value)) => value.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        Filter::And(filters) => filters.iter().all(|f| matches(doc, f)),
        Filter::Or(filters) => filters.iter().any(|f| matches(doc, f)),
    }
}

fn apply_update(doc: &mut Document, update: &Update) {
    for (field, value) in &update.set {
        set_path(doc, field, value.clone());
    }
    for (field, values) in &update.push {
        match doc.get_mut(field) {
            Some(Bson::Array(existing)) => existing.extend(values.iter().cloned()),
            _ => {
                doc.insert(field.as_str(), values.clone());
            }
        }
    }
}

fn sort_documents(docs: &mut [Document], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for (field, order) in keys {
            let ordering = compare_bson(get_path(a, field), get_path(b, field));
            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Boolean(_)) => 5,
        Some(_) => 6,
    }
}

/// Cross-type ordering: missing/null < numbers < strings < documents < arrays < booleans
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (bson_as_f64(x), bson_as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

fn bson_as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Equality with numbers compared by value regardless of width
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (bson_as_f64(a), bson_as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn bson_display(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
