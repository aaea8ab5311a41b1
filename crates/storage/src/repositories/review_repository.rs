use std::sync::Arc;

use async_trait::async_trait;
use domain::commands::review_commands::{
    CreateReviewRequest, DeleteReviewRequest, ListReviewsRequest, ReviewPage, UpdateReviewRequest,
};
use domain::commands::MutationResponse;
use domain::Review;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::{from_document, require, to_document};
use crate::context::CallContext;
use crate::document::{DocumentCollection, Filter, FindOptions, SortOrder, Update};
use crate::error::{Result, StorageError};
use crate::pagination::Window;
use crate::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReviewDocument {
    #[serde(rename = "_id")]
    id: String,
    product_id: String,
    user_id: String,
    rating: i32,
    #[serde(default)]
    comment: String,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    deleted_at: String,
}

impl ReviewDocument {
    fn into_review(self) -> std::result::Result<Review, String> {
        Ok(Review {
            created_at: timestamp::parse_required("created_at", &self.created_at)?,
            updated_at: timestamp::parse_required("updated_at", &self.updated_at)?,
            deleted_at: timestamp::parse_deleted(&self.deleted_at)?,
            id: self.id,
            product_id: self.product_id,
            user_id: self.user_id,
            rating: self.rating,
            comment: self.comment,
        })
    }
}

fn decode(operation: &'static str, document: Document) -> Result<Review> {
    from_document::<ReviewDocument>(operation, document)?
        .into_review()
        .map_err(|e| StorageError::decode(operation, e))
}

/// Repository for product reviews
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, ctx: &CallContext, request: CreateReviewRequest) -> Result<Review>;

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Review>;

    /// Live reviews whose product id or user id equals `search_by`
    async fn list(&self, ctx: &CallContext, request: &ListReviewsRequest) -> Result<ReviewPage>;

    async fn list_by_product(
        &self,
        ctx: &CallContext,
        product_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<ReviewPage>;

    /// Only the author may update, and only for the product the review belongs to
    async fn update(&self, ctx: &CallContext, request: UpdateReviewRequest) -> Result<Review>;

    async fn delete(&self, ctx: &CallContext, request: DeleteReviewRequest) -> Result<MutationResponse>;
}

pub struct DocumentReviewRepository {
    reviews: Arc<dyn DocumentCollection>,
}

impl DocumentReviewRepository {
    pub fn new(reviews: Arc<dyn DocumentCollection>) -> Self {
        Self { reviews }
    }

    async fn page(
        &self,
        ctx: &CallContext,
        filter: Filter,
        window: Window,
        sort_by: i32,
    ) -> Result<ReviewPage> {
        let mut sort = Vec::new();
        if let Some(order) = SortOrder::from_direction(sort_by) {
            sort.push(("created_at".to_string(), order));
        }
        sort.push(("_id".to_string(), SortOrder::Ascending));

        let options = FindOptions {
            sort,
            skip: window.offset as u64,
            limit: Some(window.limit as u64),
        };

        let total = ctx.run("review.list", self.reviews.count(&filter)).await?;
        let documents = ctx
            .run("review.list", self.reviews.find(&filter, &options))
            .await?;

        let reviews = documents
            .into_iter()
            .map(|d| decode("review.list", d))
            .collect::<Result<Vec<_>>>()?;

        debug!(total, returned = reviews.len(), "Listed reviews");
        Ok(ReviewPage {
            reviews,
            total: total as i64,
            offset: window.offset,
            limit: window.limit,
        })
    }
}

fn owned_by(id: &str, user_id: &str, product_id: &str) -> Filter {
    Filter::id(id)
        .and(Filter::eq("user_id", user_id))
        .and(Filter::eq("product_id", product_id))
        .and(Filter::live())
}

#[async_trait]
impl ReviewRepository for DocumentReviewRepository {
    async fn create(&self, ctx: &CallContext, request: CreateReviewRequest) -> Result<Review> {
        request.validate()?;

        let now = timestamp::format(timestamp::now());
        let document = ReviewDocument {
            id: domain::new_id(),
            product_id: request.product_id,
            user_id: request.user_id,
            rating: request.rating,
            comment: request.comment,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: timestamp::LIVE.to_string(),
        };

        let stored = to_document("review.create", &document)?;
        ctx.run("review.create", self.reviews.insert_one(stored)).await?;

        info!(review_id = %document.id, product_id = %document.product_id, "Review created");
        document
            .into_review()
            .map_err(|e| StorageError::decode("review.create", e))
    }

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Review> {
        require("review id", id)?;

        let filter = Filter::id(id).and(Filter::live());
        match ctx.run("review.get_by_id", self.reviews.find_one(&filter)).await? {
            Some(document) => decode("review.get_by_id", document),
            None => Err(StorageError::not_found("review", id)),
        }
    }

    async fn list(&self, ctx: &CallContext, request: &ListReviewsRequest) -> Result<ReviewPage> {
        request.validate()?;
        let window = Window::resolve(request.offset, request.limit)?;

        let filter = match request.search_by.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => Filter::live().and(Filter::Or(vec![
                Filter::eq("product_id", search),
                Filter::eq("user_id", search),
            ])),
            _ => Filter::live(),
        };

        self.page(ctx, filter, window, request.sort_by).await
    }

    async fn list_by_product(
        &self,
        ctx: &CallContext,
        product_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<ReviewPage> {
        require("product id", product_id)?;
        let window = Window::resolve(offset, limit)?;

        let filter = Filter::live().and(Filter::eq("product_id", product_id));
        self.page(ctx, filter, window, -1).await
    }

    async fn update(&self, ctx: &CallContext, request: UpdateReviewRequest) -> Result<Review> {
        request.validate()?;

        let filter = owned_by(&request.id, &request.user_id, &request.product_id);
        let update = Update::default()
            .set("rating", request.rating)
            .set("comment", request.comment)
            .set("updated_at", timestamp::format(timestamp::now()));

        match ctx
            .run("review.update", self.reviews.find_one_and_update(&filter, &update))
            .await?
        {
            Some(document) => {
                info!(review_id = %request.id, "Review updated");
                decode("review.update", document)
            }
            None => Err(StorageError::not_found("review", request.id)),
        }
    }

    async fn delete(&self, ctx: &CallContext, request: DeleteReviewRequest) -> Result<MutationResponse> {
        request.validate()?;

        let now = timestamp::format(timestamp::now());
        let filter = owned_by(&request.id, &request.user_id, &request.product_id);
        let update = Update::default()
            .set("deleted_at", now.clone())
            .set("updated_at", now);

        let modified = ctx
            .run("review.delete", self.reviews.update_one(&filter, &update))
            .await?;

        if modified == 0 {
            debug!(review_id = %request.id, "Review delete matched nothing");
            return Ok(MutationResponse::not_modified("review not found"));
        }

        info!(review_id = %request.id, "Review deleted");
        Ok(MutationResponse::done("review deleted"))
    }
}
