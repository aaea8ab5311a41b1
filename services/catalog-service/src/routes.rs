use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{basket, categories, health, orders, products, reviews};
use crate::state::AppState;

/// Build the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics_handler))

        // Products
        .route(
            "/api/v1/products",
            post(products::create_product).get(products::search_products),
        )
        .route("/api/v1/products/recommendations", get(products::recommendations))
        .route(
            "/api/v1/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/v1/products/:id/reviews", get(products::product_reviews))

        // Categories
        .route(
            "/api/v1/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/api/v1/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )

        // Reviews
        .route(
            "/api/v1/reviews",
            post(reviews::create_review).get(reviews::list_reviews),
        )
        .route(
            "/api/v1/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )

        // Orders
        .route("/api/v1/orders", post(orders::create_order))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/users/:user_id/orders", get(orders::list_user_orders))

        // Basket
        .route("/api/v1/basket", post(basket::add_to_basket))
        .route("/api/v1/basket/:user_id", get(basket::get_basket))
        .route(
            "/api/v1/basket/:user_id/:product_id",
            get(basket::get_basket_item).delete(basket::remove_from_basket),
        )

        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
