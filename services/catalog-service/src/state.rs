use std::sync::Arc;
use std::time::Duration;

use storage::{CallContext, Storage};

use crate::service::CatalogService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
    store_timeout: Duration,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, store_timeout: Duration) -> Self {
        Self {
            service: Arc::new(CatalogService::new(storage)),
            store_timeout,
        }
    }

    /// Limits for the store calls made while serving one request
    pub fn request_context(&self) -> CallContext {
        CallContext::with_timeout(self.store_timeout)
    }
}
