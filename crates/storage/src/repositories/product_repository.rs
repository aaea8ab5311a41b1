use std::sync::Arc;

use async_trait::async_trait;
use domain::commands::product_commands::{
    CreateProductRequest, CreateProductResponse, ProductFilter, ProductPage, UpdateProductRequest,
};
use domain::commands::MutationResponse;
use domain::{Discount, Product};
use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::category_repository::CategoryDocument;
use super::{from_document, require, to_document};
use crate::context::CallContext;
use crate::document::{bson_as_i64, DocumentCollection, Filter, FindOptions, SortOrder, Update};
use crate::error::{Result, StorageError};
use crate::pagination::Page;
use crate::pipeline::{ProductQuery, TOTAL_ALIAS};
use crate::timestamp;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DiscountDocument {
    pub status: bool,
    pub discount_price: f64,
}

impl From<Discount> for DiscountDocument {
    fn from(discount: Discount) -> Self {
        Self {
            status: discount.active,
            discount_price: discount.discounted_price,
        }
    }
}

/// Stored shape of a product. Search results also carry the joined category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProductDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub discount: DiscountDocument,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub deleted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryDocument>,
}

impl ProductDocument {
    fn into_product(self) -> std::result::Result<Product, String> {
        Ok(Product {
            created_at: timestamp::parse_required("created_at", &self.created_at)?,
            updated_at: timestamp::parse_required("updated_at", &self.updated_at)?,
            deleted_at: timestamp::parse_deleted(&self.deleted_at)?,
            category: self.category.map(CategoryDocument::into_category).transpose()?,
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            images: self.images,
            discount: Discount {
                active: self.discount.status,
                discounted_price: self.discount.discount_price,
            },
        })
    }
}

fn decode(operation: &'static str, document: Document) -> Result<Product> {
    from_document::<ProductDocument>(operation, document)?
        .into_product()
        .map_err(|e| StorageError::decode(operation, e))
}

/// Repository for catalog products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(
        &self,
        ctx: &CallContext,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse>;

    /// Live product by id
    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Product>;

    /// Replace the mutable fields of a live product and append its images
    async fn update(&self, ctx: &CallContext, request: UpdateProductRequest) -> Result<Product>;

    /// Mark a live product deleted. Matching nothing is reported, not raised.
    async fn soft_delete(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse>;

    /// Filtered, sorted page of live products plus the filtered total
    async fn search(&self, ctx: &CallContext, filter: &ProductFilter) -> Result<ProductPage>;

    /// Live products with an active discount
    async fn recommendations(&self, ctx: &CallContext) -> Result<Vec<Product>>;
}

pub struct DocumentProductRepository {
    products: Arc<dyn DocumentCollection>,
}

impl DocumentProductRepository {
    pub fn new(products: Arc<dyn DocumentCollection>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductRepository for DocumentProductRepository {
    async fn create(
        &self,
        ctx: &CallContext,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse> {
        request.validate()?;

        let now = timestamp::format(timestamp::now());
        let document = ProductDocument {
            id: domain::new_id(),
            category_id: request.category_id,
            name: request.name,
            description: request.description,
            price: request.price,
            stock: request.stock,
            images: request.images,
            discount: request.discount.into(),
            created_at: now.clone(),
            updated_at: now,
            deleted_at: timestamp::LIVE.to_string(),
            category: None,
        };
        let id = document.id.clone();

        let document = to_document("product.create", &document)?;
        ctx.run("product.create", self.products.insert_one(document))
            .await?;

        info!(product_id = %id, "Product created");
        Ok(CreateProductResponse {
            success: true,
            message: "product created".to_string(),
            id,
        })
    }

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Product> {
        require("product id", id)?;

        let filter = Filter::id(id).and(Filter::live());
        match ctx
            .run("product.get_by_id", self.products.find_one(&filter))
            .await?
        {
            Some(document) => decode("product.get_by_id", document),
            None => Err(StorageError::not_found("product", id)),
        }
    }

    async fn update(&self, ctx: &CallContext, request: UpdateProductRequest) -> Result<Product> {
        request.validate()?;

        let discount = DiscountDocument::from(request.discount);
        let filter = Filter::id(&request.id).and(Filter::live());
        let update = Update::default()
            .set("name", request.name)
            .set("description", request.description)
            .set("price", request.price)
            .set("stock", request.stock)
            .set(
                "discount",
                doc! {
                    "status": discount.status,
                    "discount_price": discount.discount_price,
                },
            )
            .set("updated_at", timestamp::format(timestamp::now()))
            .push_all(
                "images",
                request.images.into_iter().map(Bson::String).collect(),
            );

        match ctx
            .run(
                "product.update",
                self.products.find_one_and_update(&filter, &update),
            )
            .await?
        {
            Some(document) => {
                info!(product_id = %request.id, "Product updated");
                decode("product.update", document)
            }
            None => Err(StorageError::not_found("product", request.id)),
        }
    }

    async fn soft_delete(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse> {
        require("product id", id)?;

        let now = timestamp::format(timestamp::now());
        let filter = Filter::id(id).and(Filter::live());
        let update = Update::default()
            .set("deleted_at", now.clone())
            .set("updated_at", now);

        let modified = ctx
            .run("product.soft_delete", self.products.update_one(&filter, &update))
            .await?;

        if modified == 0 {
            debug!(product_id = %id, "Product delete matched nothing");
            return Ok(MutationResponse::not_modified(
                "product not found or already deleted",
            ));
        }

        info!(product_id = %id, "Product deleted");
        Ok(MutationResponse::done("product deleted"))
    }

    async fn search(&self, ctx: &CallContext, filter: &ProductFilter) -> Result<ProductPage> {
        filter.validate()?;
        let page = Page::resolve(filter.page, filter.limit)?;

        let query = ProductQuery::from_filter(filter);
        let count_pipeline = query.count_pipeline();
        let page_pipeline = query.page_pipeline(&page);

        let (counted, documents) = tokio::try_join!(
            ctx.run("product.search.count", self.products.aggregate(&count_pipeline)),
            ctx.run("product.search", self.products.aggregate(&page_pipeline)),
        )?;

        let total = counted
            .first()
            .and_then(|d| d.get(TOTAL_ALIAS))
            .and_then(bson_as_i64)
            .unwrap_or(0);

        let products = documents
            .into_iter()
            .map(|d| decode("product.search", d))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            total,
            returned = products.len(),
            page = page.page,
            "Product search completed"
        );

        Ok(ProductPage {
            products,
            total,
            limit: page.limit,
            offset: page.offset(),
        })
    }

    async fn recommendations(&self, ctx: &CallContext) -> Result<Vec<Product>> {
        let filter = Filter::live().and(Filter::eq("discount.status", true));
        let options = FindOptions {
            sort: vec![
                ("created_at".to_string(), SortOrder::Descending),
                ("_id".to_string(), SortOrder::Ascending),
            ],
            ..Default::default()
        };

        let documents = ctx
            .run("product.recommendations", self.products.find(&filter, &options))
            .await?;

        documents
            .into_iter()
            .map(|d| decode("product.recommendations", d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentStore, MemoryDocumentStore, PRODUCTS};

    fn repository() -> DocumentProductRepository {
        DocumentProductRepository::new(MemoryDocumentStore::new().collection(PRODUCTS))
    }

    fn create_request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            category_id: "c1".to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            price: 10.0,
            stock: 5,
            images: vec!["a.png".to_string()],
            discount: Discount::default(),
        }
    }

    #[tokio::test]
    async fn test_update_appends_images_and_restamps() {
        let repo = repository();
        let ctx = CallContext::background();
        let created = repo.create(&ctx, create_request("Phone")).await.unwrap();

        let updated = repo
            .update(
                &ctx,
                UpdateProductRequest {
                    id: created.id.clone(),
                    name: "Phone X".to_string(),
                    description: "new".to_string(),
                    price: 12.5,
                    stock: 2,
                    images: vec!["b.png".to_string()],
                    discount: Discount {
                        active: true,
                        discounted_price: 11.0,
                    },
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Phone X");
        assert_eq!(updated.images, vec!["a.png", "b.png"]);
        assert!(updated.discount.active);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_deleted_product_is_not_found() {
        let repo = repository();
        let ctx = CallContext::background();
        let created = repo.create(&ctx, create_request("Phone")).await.unwrap();
        repo.soft_delete(&ctx, &created.id).await.unwrap();

        let err = repo
            .update(
                &ctx,
                UpdateProductRequest {
                    id: created.id,
                    name: "Phone".to_string(),
                    description: String::new(),
                    price: 1.0,
                    stock: 1,
                    images: vec![],
                    discount: Discount::default(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_recommendations_only_live_discounted() {
        let repo = repository();
        let ctx = CallContext::background();

        let mut discounted = create_request("Deal");
        discounted.discount = Discount {
            active: true,
            discounted_price: 5.0,
        };
        let deal = repo.create(&ctx, discounted.clone()).await.unwrap();
        let gone = repo.create(&ctx, discounted).await.unwrap();
        repo.create(&ctx, create_request("Regular")).await.unwrap();
        repo.soft_delete(&ctx, &gone.id).await.unwrap();

        let products = repo.recommendations(&ctx).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, deal.id);
    }

    #[tokio::test]
    async fn test_invalid_paging_rejected_before_store() {
        let filter = ProductFilter {
            limit: -1,
            ..Default::default()
        };
        let err = repository()
            .search(&CallContext::background(), &filter)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[test]
    fn test_document_decodes_joined_category() {
        let document = doc! {
            "_id": "p1",
            "category_id": "c1",
            "name": "Phone",
            "description": "",
            "price": 10,
            "stock": 3_i32,
            "images": [],
            "discount": { "status": false, "discount_price": 0.0 },
            "created_at": "2024-01-01 00:00:00",
            "updated_at": "2024-01-01 00:00:00",
            "deleted_at": "",
            "category": {
                "_id": "c1",
                "name": "Electronics",
                "description": "",
                "created_at": "2024-01-01 00:00:00",
                "updated_at": "2024-01-01 00:00:00",
                "deleted_at": "",
            },
            "comment_count": 4,
        };

        let product = decode("test", document).unwrap();
        assert_eq!(product.price, 10.0);
        assert_eq!(product.stock, 3);
        assert_eq!(product.category.unwrap().name, "Electronics");
    }

    #[test]
    fn test_bad_timestamp_is_decode_error() {
        let document = doc! {
            "_id": "p1",
            "name": "Phone",
            "price": 1.0,
            "stock": 1_i64,
            "created_at": "yesterday",
            "updated_at": "2024-01-01 00:00:00",
        };
        assert!(matches!(
            decode("product.get_by_id", document),
            Err(StorageError::Decode { operation: "product.get_by_id", .. })
        ));
    }
}
