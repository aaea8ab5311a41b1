use std::sync::Arc;

use async_trait::async_trait;
use domain::commands::category_commands::{
    CategoryPage, CreateCategoryRequest, CreateCategoryResponse, ListCategoriesRequest,
    UpdateCategoryRequest,
};
use domain::commands::MutationResponse;
use domain::Category;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::{from_document, require, to_document};
use crate::context::CallContext;
use crate::document::{DocumentCollection, Filter, FindOptions, SortOrder, Update};
use crate::error::{Result, StorageError};
use crate::pagination::Window;
use crate::timestamp;

/// Stored shape of a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub deleted_at: String,
}

impl CategoryDocument {
    pub fn into_category(self) -> std::result::Result<Category, String> {
        Ok(Category {
            created_at: timestamp::parse_required("created_at", &self.created_at)?,
            updated_at: timestamp::parse_required("updated_at", &self.updated_at)?,
            deleted_at: timestamp::parse_deleted(&self.deleted_at)?,
            id: self.id,
            name: self.name,
            description: self.description,
        })
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(
        &self,
        ctx: &CallContext,
        request: CreateCategoryRequest,
    ) -> Result<CreateCategoryResponse>;

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Category>;

    async fn list(&self, ctx: &CallContext, request: &ListCategoriesRequest) -> Result<CategoryPage>;

    async fn update(&self, ctx: &CallContext, request: UpdateCategoryRequest) -> Result<Category>;

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse>;
}

pub struct DocumentCategoryRepository {
    categories: Arc<dyn DocumentCollection>,
}

impl DocumentCategoryRepository {
    pub fn new(categories: Arc<dyn DocumentCollection>) -> Self {
        Self { categories }
    }
}

fn decode(operation: &'static str, document: mongodb::bson::Document) -> Result<Category> {
    from_document::<CategoryDocument>(operation, document)?
        .into_category()
        .map_err(|e| StorageError::decode(operation, e))
}

#[async_trait]
impl CategoryRepository for DocumentCategoryRepository {
    async fn create(
        &self,
        ctx: &CallContext,
        request: CreateCategoryRequest,
    ) -> Result<CreateCategoryResponse> {
        request.validate()?;

        let now = timestamp::format(timestamp::now());
        let document = CategoryDocument {
            id: domain::new_id(),
            name: request.name,
            description: request.description,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: timestamp::LIVE.to_string(),
        };
        let id = document.id.clone();

        let document = to_document("category.create", &document)?;
        ctx.run("category.create", self.categories.insert_one(document))
            .await?;

        info!(category_id = %id, "Category created");
        Ok(CreateCategoryResponse {
            status: true,
            message: "category created".to_string(),
            id,
        })
    }

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Category> {
        require("category id", id)?;

        let filter = Filter::id(id).and(Filter::live());
        match ctx
            .run("category.get_by_id", self.categories.find_one(&filter))
            .await?
        {
            Some(document) => decode("category.get_by_id", document),
            None => Err(StorageError::not_found("category", id)),
        }
    }

    async fn list(&self, ctx: &CallContext, request: &ListCategoriesRequest) -> Result<CategoryPage> {
        let window = Window::resolve(request.offset, request.limit)?;

        let filter = Filter::live();
        let options = FindOptions {
            sort: vec![
                ("created_at".to_string(), SortOrder::Ascending),
                ("_id".to_string(), SortOrder::Ascending),
            ],
            skip: window.offset as u64,
            limit: Some(window.limit as u64),
        };

        let total = ctx
            .run("category.list", self.categories.count(&filter))
            .await?;
        let documents = ctx
            .run("category.list", self.categories.find(&filter, &options))
            .await?;

        let categories = documents
            .into_iter()
            .map(|d| decode("category.list", d))
            .collect::<Result<Vec<_>>>()?;

        debug!(total, returned = categories.len(), "Listed categories");
        Ok(CategoryPage {
            categories,
            total: total as i64,
            offset: window.offset,
            limit: window.limit,
        })
    }

    async fn update(&self, ctx: &CallContext, request: UpdateCategoryRequest) -> Result<Category> {
        request.validate()?;

        let filter = Filter::id(&request.id).and(Filter::live());
        let update = Update::default()
            .set("name", request.name)
            .set("description", request.description)
            .set("updated_at", timestamp::format(timestamp::now()));

        match ctx
            .run(
                "category.update",
                self.categories.find_one_and_update(&filter, &update),
            )
            .await?
        {
            Some(document) => {
                info!(category_id = %request.id, "Category updated");
                decode("category.update", document)
            }
            None => Err(StorageError::not_found("category", request.id)),
        }
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse> {
        require("category id", id)?;

        let now = timestamp::format(timestamp::now());
        let filter = Filter::id(id).and(Filter::live());
        let update = Update::default()
            .set("deleted_at", now.clone())
            .set("updated_at", now);

        let modified = ctx
            .run("category.delete", self.categories.update_one(&filter, &update))
            .await?;

        if modified == 0 {
            debug!(category_id = %id, "Category delete matched nothing");
            return Ok(MutationResponse::not_modified("category not found"));
        }

        info!(category_id = %id, "Category deleted");
        Ok(MutationResponse::done("category deleted"))
    }
}
