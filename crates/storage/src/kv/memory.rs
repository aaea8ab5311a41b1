use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ListStore;
use crate::error::StoreError;

/// Process-local list store with the same removal semantics as Redis `LREM`
#[derive(Clone, Default)]
pub struct MemoryListStore {
    lists: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.lists
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .push(value);
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.lists.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn remove_value(&self, key: &str, value: &str, count: i64) -> Result<u64, StoreError> {
        let mut lists = self.lists.lock().await;
        let Some(list) = lists.get_mut(key) else {
            return Ok(0);
        };

        let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
        let mut removed = 0;

        if count >= 0 {
            list.retain(|item| {
                if removed < limit && item == value {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        } else {
            let mut kept = Vec::with_capacity(list.len());
            for item in list.drain(..).rev() {
                if removed < limit && item == value {
                    removed += 1;
                } else {
                    kept.push(item);
                }
            }
            kept.reverse();
            *list = kept;
        }

        // Redis drops a list once it is empty
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(removed as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryListStore {
        let store = MemoryListStore::new();
        for value in ["a", "b", "a", "c", "a"] {
            store.push("k", value.to_string()).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_remove_from_head() {
        let store = seeded().await;
        assert_eq!(store.remove_value("k", "a", 2).await.unwrap(), 2);
        assert_eq!(store.range("k").await.unwrap(), vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_remove_from_tail() {
        let store = seeded().await;
        assert_eq!(store.remove_value("k", "a", -1).await.unwrap(), 1);
        assert_eq!(store.range("k").await.unwrap(), vec!["a", "b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_remove_all_drops_empty_list() {
        let store = MemoryListStore::new();
        store.push("k", "a".to_string()).await.unwrap();
        assert_eq!(store.remove_value("k", "a", 0).await.unwrap(), 1);
        assert!(store.range("k").await.unwrap().is_empty());
        assert_eq!(store.remove_value("k", "a", 0).await.unwrap(), 0);
    }
}
