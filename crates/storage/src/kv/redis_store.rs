use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::ListStore;
use crate::error::StoreError;

/// Redis lists behind a reconnecting connection manager
#[derive(Clone)]
pub struct RedisListStore {
    conn: ConnectionManager,
}

impl RedisListStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Redis list store initialized");
        Ok(Self { conn })
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn push(&self, key: &str, value: String) -> Result<(), StoreError> {
        let len: i64 = self.conn.clone().rpush(key, value).await?;
        debug!(key = %key, len, "Appended list value");
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.conn.clone().lrange(key, 0, -1).await?)
    }

    async fn remove_value(&self, key: &str, value: &str, count: i64) -> Result<u64, StoreError> {
        let removed: i64 = self.conn.clone().lrem(key, count as isize, value).await?;
        debug!(key = %key, removed, "Removed list values");
        Ok(removed.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: String = redis::cmd("PING").query_async(&mut self.conn.clone()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_list_operations() {
        let store = RedisListStore::connect("redis://localhost:6379")
            .await
            .expect("Failed to connect to Redis");
        let key = "basket:test-list-operations";
        for stale in ["a", "b"] {
            store.remove_value(key, stale, 0).await.unwrap();
        }

        store.push(key, "a".to_string()).await.unwrap();
        store.push(key, "b".to_string()).await.unwrap();
        store.push(key, "a".to_string()).await.unwrap();
        assert_eq!(store.range(key).await.unwrap(), vec!["a", "b", "a"]);

        assert_eq!(store.remove_value(key, "a", 1).await.unwrap(), 1);
        assert_eq!(store.range(key).await.unwrap(), vec!["b", "a"]);

        assert_eq!(store.remove_value(key, "a", 0).await.unwrap(), 1);
        assert_eq!(store.remove_value(key, "b", 0).await.unwrap(), 1);
        assert!(store.range(key).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_ping() {
        let store = RedisListStore::connect("redis://localhost:6379")
            .await
            .expect("Failed to connect to Redis");

        assert!(store.ping().await.is_ok());
    }
}
