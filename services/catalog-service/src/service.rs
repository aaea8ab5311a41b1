use std::sync::Arc;

use domain::commands::basket_commands::{AddToBasketRequest, AddToBasketResponse, BasketResponse};
use domain::commands::category_commands::{
    CategoryPage, CreateCategoryRequest, CreateCategoryResponse, ListCategoriesRequest,
    UpdateCategoryRequest,
};
use domain::commands::order_commands::{CreateOrderResponse, ListUserOrdersRequest, OrderPage};
use domain::commands::product_commands::{
    CreateProductRequest, CreateProductResponse, ProductFilter, ProductPage, UpdateProductRequest,
};
use domain::commands::review_commands::{
    CreateReviewRequest, DeleteReviewRequest, ListReviewsRequest, ReviewPage, UpdateReviewRequest,
};
use domain::commands::MutationResponse;
use domain::{BasketEntry, Category, Order, Product, Review};
use storage::{CallContext, Storage, StorageError};
use tracing::{debug, error};

/// One method per catalog operation. Each call goes straight to its
/// repository; failures are logged here and returned unchanged.
pub struct CatalogService {
    storage: Arc<dyn Storage>,
}

type Result<T> = std::result::Result<T, StorageError>;

fn logged<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        match e {
            StorageError::NotFound { .. } | StorageError::Validation(_) => {
                debug!(operation, error = %e, "error in {}", operation)
            }
            _ => error!(operation, error = %e, "error in {}", operation),
        }
    }
    result
}

impl CatalogService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // Products

    pub async fn create_product(
        &self,
        ctx: &CallContext,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse> {
        logged("create_product", self.storage.products().create(ctx, request).await)
    }

    pub async fn get_product(&self, ctx: &CallContext, id: &str) -> Result<Product> {
        logged("get_product", self.storage.products().get_by_id(ctx, id).await)
    }

    pub async fn update_product(
        &self,
        ctx: &CallContext,
        request: UpdateProductRequest,
    ) -> Result<Product> {
        logged("update_product", self.storage.products().update(ctx, request).await)
    }

    pub async fn delete_product(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse> {
        logged("delete_product", self.storage.products().soft_delete(ctx, id).await)
    }

    pub async fn search_products(
        &self,
        ctx: &CallContext,
        filter: &ProductFilter,
    ) -> Result<ProductPage> {
        logged("search_products", self.storage.products().search(ctx, filter).await)
    }

    pub async fn recommendations(&self, ctx: &CallContext) -> Result<Vec<Product>> {
        logged(
            "recommendations",
            self.storage.products().recommendations(ctx).await,
        )
    }

    // Categories

    pub async fn create_category(
        &self,
        ctx: &CallContext,
        request: CreateCategoryRequest,
    ) -> Result<CreateCategoryResponse> {
        logged("create_category", self.storage.categories().create(ctx, request).await)
    }

    pub async fn get_category(&self, ctx: &CallContext, id: &str) -> Result<Category> {
        logged("get_category", self.storage.categories().get_by_id(ctx, id).await)
    }

    pub async fn list_categories(
        &self,
        ctx: &CallContext,
        request: &ListCategoriesRequest,
    ) -> Result<CategoryPage> {
        logged("list_categories", self.storage.categories().list(ctx, request).await)
    }

    pub async fn update_category(
        &self,
        ctx: &CallContext,
        request: UpdateCategoryRequest,
    ) -> Result<Category> {
        logged("update_category", self.storage.categories().update(ctx, request).await)
    }

    pub async fn delete_category(&self, ctx: &CallContext, id: &str) -> Result<MutationResponse> {
        logged("delete_category", self.storage.categories().delete(ctx, id).await)
    }

    // Reviews

    pub async fn create_review(&self, ctx: &CallContext, request: CreateReviewRequest) -> Result<Review> {
        logged("create_review", self.storage.reviews().create(ctx, request).await)
    }

    pub async fn get_review(&self, ctx: &CallContext, id: &str) -> Result<Review> {
        logged("get_review", self.storage.reviews().get_by_id(ctx, id).await)
    }

    pub async fn list_reviews(&self, ctx: &CallContext, request: &ListReviewsRequest) -> Result<ReviewPage> {
        logged("list_reviews", self.storage.reviews().list(ctx, request).await)
    }

    pub async fn list_product_reviews(
        &self,
        ctx: &CallContext,
        product_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<ReviewPage> {
        logged(
            "list_product_reviews",
            self.storage
                .reviews()
                .list_by_product(ctx, product_id, offset, limit)
                .await,
        )
    }

    pub async fn update_review(&self, ctx: &CallContext, request: UpdateReviewRequest) -> Result<Review> {
        logged("update_review", self.storage.reviews().update(ctx, request).await)
    }

    pub async fn delete_review(
        &self,
        ctx: &CallContext,
        request: DeleteReviewRequest,
    ) -> Result<MutationResponse> {
        logged("delete_review", self.storage.reviews().delete(ctx, request).await)
    }

    // Orders

    pub async fn create_order(&self, ctx: &CallContext, order: Order) -> Result<CreateOrderResponse> {
        logged("create_order", self.storage.orders().create(ctx, order).await)
    }

    pub async fn get_order(&self, ctx: &CallContext, id: &str) -> Result<Order> {
        logged("get_order", self.storage.orders().get_by_id(ctx, id).await)
    }

    pub async fn list_user_orders(
        &self,
        ctx: &CallContext,
        request: &ListUserOrdersRequest,
    ) -> Result<OrderPage> {
        logged("list_user_orders", self.storage.orders().list_by_user(ctx, request).await)
    }

    // Basket

    pub async fn add_to_basket(
        &self,
        ctx: &CallContext,
        request: AddToBasketRequest,
    ) -> Result<AddToBasketResponse> {
        logged("add_to_basket", self.storage.basket().add(ctx, request).await)
    }

    pub async fn get_basket(&self, ctx: &CallContext, user_id: &str) -> Result<BasketResponse> {
        let entries = logged("get_basket", self.storage.basket().list_all(ctx, user_id).await)?;
        Ok(BasketResponse {
            user_id: user_id.to_string(),
            entries,
        })
    }

    pub async fn get_basket_item(
        &self,
        ctx: &CallContext,
        user_id: &str,
        product_id: &str,
    ) -> Result<BasketEntry> {
        logged(
            "get_basket_item",
            self.storage
                .basket()
                .find_by_product_id(ctx, user_id, product_id)
                .await,
        )
    }

    pub async fn remove_from_basket(
        &self,
        ctx: &CallContext,
        user_id: &str,
        product_id: &str,
    ) -> Result<MutationResponse> {
        logged(
            "remove_from_basket",
            self.storage.basket().remove(ctx, user_id, product_id).await,
        )
    }

    pub async fn ping(&self, ctx: &CallContext) -> Result<()> {
        logged("ping", self.storage.ping(ctx).await)
    }
}
