use std::sync::Arc;

use async_trait::async_trait;
use domain::commands::basket_commands::{AddToBasketRequest, AddToBasketResponse};
use domain::commands::MutationResponse;
use domain::BasketEntry;
use tracing::{debug, info};
use validator::Validate;

use super::require;
use crate::context::CallContext;
use crate::error::{Result, StorageError};
use crate::kv::ListStore;
use crate::timestamp;

/// Per-user basket held as a list of JSON-encoded entries.
///
/// Removal never rewrites the list: each matching stored value is removed
/// with one atomic list-remove, so an `add` racing a `remove` for the same
/// user is never lost.
#[async_trait]
pub trait BasketRepository: Send + Sync {
    /// Append an entry. Adding the same product twice keeps both entries.
    async fn add(&self, ctx: &CallContext, request: AddToBasketRequest) -> Result<AddToBasketResponse>;

    /// Every entry for the user, oldest first. An empty basket is `NotFound`.
    async fn list_all(&self, ctx: &CallContext, user_id: &str) -> Result<Vec<BasketEntry>>;

    async fn find_by_product_id(
        &self,
        ctx: &CallContext,
        user_id: &str,
        product_id: &str,
    ) -> Result<BasketEntry>;

    /// Remove every entry for the product
    async fn remove(&self, ctx: &CallContext, user_id: &str, product_id: &str) -> Result<MutationResponse>;

    /// Remove the first entry for the product. Returns whether one was removed.
    async fn consume(&self, ctx: &CallContext, user_id: &str, product_id: &str) -> Result<bool>;
}

pub struct ListBasketRepository {
    lists: Arc<dyn ListStore>,
}

impl ListBasketRepository {
    pub fn new(lists: Arc<dyn ListStore>) -> Self {
        Self { lists }
    }

    /// Stored values paired with their decoded entries
    async fn entries(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        user_id: &str,
    ) -> Result<Vec<(String, BasketEntry)>> {
        let raw = ctx.run(operation, self.lists.range(&basket_key(user_id))).await?;

        raw.into_iter()
            .map(|value| {
                let entry = serde_json::from_str::<BasketEntry>(&value)
                    .map_err(|e| StorageError::decode(operation, e))?;
                Ok((value, entry))
            })
            .collect()
    }
}

pub fn basket_key(user_id: &str) -> String {
    format!("basket:{}", user_id)
}

#[async_trait]
impl BasketRepository for ListBasketRepository {
    async fn add(&self, ctx: &CallContext, request: AddToBasketRequest) -> Result<AddToBasketResponse> {
        request.validate()?;

        let entry = request.into_entry(timestamp::now());
        let value = serde_json::to_string(&entry).map_err(|e| StorageError::decode("basket.add", e))?;

        ctx.run("basket.add", self.lists.push(&basket_key(&entry.user_id), value))
            .await?;

        info!(user_id = %entry.user_id, product_id = %entry.product_id, "Added to basket");
        Ok(AddToBasketResponse {
            status: true,
            message: "added to basket".to_string(),
        })
    }

    async fn list_all(&self, ctx: &CallContext, user_id: &str) -> Result<Vec<BasketEntry>> {
        require("user id", user_id)?;

        let entries: Vec<BasketEntry> = self
            .entries(ctx, "basket.list_all", user_id)
            .await?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect();

        if entries.is_empty() {
            return Err(StorageError::not_found("basket", user_id));
        }
        Ok(entries)
    }

    async fn find_by_product_id(
        &self,
        ctx: &CallContext,
        user_id: &str,
        product_id: &str,
    ) -> Result<BasketEntry> {
        require("user id", user_id)?;
        require("product id", product_id)?;

        self.entries(ctx, "basket.find_by_product_id", user_id)
            .await?
            .into_iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.product_id == product_id)
            .ok_or_else(|| StorageError::not_found("basket entry", product_id))
    }

    async fn remove(&self, ctx: &CallContext, user_id: &str, product_id: &str) -> Result<MutationResponse> {
        require("user id", user_id)?;
        require("product id", product_id)?;

        let mut matching: Vec<String> = self
            .entries(ctx, "basket.remove", user_id)
            .await?
            .into_iter()
            .filter(|(_, entry)| entry.product_id == product_id)
            .map(|(value, _)| value)
            .collect();
        matching.sort();
        matching.dedup();

        let key = basket_key(user_id);
        let mut removed = 0;
        for value in &matching {
            removed += ctx
                .run("basket.remove", self.lists.remove_value(&key, value, 0))
                .await?;
        }

        if removed == 0 {
            debug!(user_id = %user_id, product_id = %product_id, "Nothing to remove from basket");
            return Ok(MutationResponse::not_modified("product not in basket"));
        }

        info!(user_id = %user_id, product_id = %product_id, removed, "Removed from basket");
        Ok(MutationResponse::done("removed from basket"))
    }

    async fn consume(&self, ctx: &CallContext, user_id: &str, product_id: &str) -> Result<bool> {
        require("user id", user_id)?;
        require("product id", product_id)?;

        let first = self
            .entries(ctx, "basket.consume", user_id)
            .await?
            .into_iter()
            .find(|(_, entry)| entry.product_id == product_id);

        let Some((value, _)) = first else {
            return Ok(false);
        };

        let removed = ctx
            .run(
                "basket.consume",
                self.lists.remove_value(&basket_key(user_id), &value, 1),
            )
            .await?;
        Ok(removed > 0)
    }
}
