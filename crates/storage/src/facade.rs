use std::sync::Arc;

use async_trait::async_trait;
use common::AppConfig;
use tracing::info;

use crate::context::CallContext;
use crate::document::{
    DocumentStore, MemoryDocumentStore, MongoDocumentStore, CATEGORIES, ORDERS, PRODUCTS, REVIEWS,
};
use crate::error::{Result, StoreError};
use crate::kv::{ListStore, MemoryListStore, RedisListStore};
use crate::repositories::{
    BasketRepository, CategoryRepository, DocumentCategoryRepository, DocumentOrderRepository,
    DocumentProductRepository, DocumentReviewRepository, ListBasketRepository, OrderRepository,
    ProductRepository, ReviewRepository,
};

/// Every repository behind one handle
#[async_trait]
pub trait Storage: Send + Sync {
    fn products(&self) -> Arc<dyn ProductRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn basket(&self) -> Arc<dyn BasketRepository>;

    /// Round trip to both stores
    async fn ping(&self, ctx: &CallContext) -> Result<()>;
}

/// Owns the document store and list store handles for the life of the
/// process. Repositories are cheap views bound to one collection or key space.
#[derive(Clone)]
pub struct StorageImpl {
    documents: Arc<dyn DocumentStore>,
    lists: Arc<dyn ListStore>,
}

impl StorageImpl {
    pub fn new(documents: Arc<dyn DocumentStore>, lists: Arc<dyn ListStore>) -> Self {
        Self { documents, lists }
    }

    /// Connect to MongoDB and Redis
    pub async fn connect(config: &AppConfig) -> std::result::Result<Self, StoreError> {
        let documents = MongoDocumentStore::connect(&config.mongo.uri, &config.mongo.database).await?;
        let lists = RedisListStore::connect(&config.redis_url).await?;

        info!("Storage connected");
        Ok(Self::new(Arc::new(documents), Arc::new(lists)))
    }

    /// Both stores held in process memory
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryListStore::new()),
        )
    }
}

#[async_trait]
impl Storage for StorageImpl {
    fn products(&self) -> Arc<dyn ProductRepository> {
        Arc::new(DocumentProductRepository::new(self.documents.collection(PRODUCTS)))
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        Arc::new(DocumentCategoryRepository::new(
            self.documents.collection(CATEGORIES),
        ))
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        Arc::new(DocumentReviewRepository::new(self.documents.collection(REVIEWS)))
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        Arc::new(DocumentOrderRepository::new(self.documents.collection(ORDERS)))
    }

    fn basket(&self) -> Arc<dyn BasketRepository> {
        Arc::new(ListBasketRepository::new(self.lists.clone()))
    }

    async fn ping(&self, ctx: &CallContext) -> Result<()> {
        ctx.run("storage.ping.documents", self.documents.ping()).await?;
        ctx.run("storage.ping.lists", self.lists.ping()).await?;
        Ok(())
    }
}
