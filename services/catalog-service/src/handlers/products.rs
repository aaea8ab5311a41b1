use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::commands::product_commands::{
    CreateProductRequest, CreateProductResponse, ProductFilter, ProductPage, UpdateProductRequest,
};
use domain::commands::review_commands::ReviewPage;
use domain::commands::MutationResponse;
use domain::Product;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewWindow {
    pub offset: i64,
    pub limit: i64,
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreateProductResponse>), ApiError> {
    info!("Received create product request: {}", request.name);

    let ctx = state.request_context();
    let response = state.service.create_product(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.get_product(&ctx, &id).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    info!("Received update product request: {}", id);
    request.id = id;

    let ctx = state.request_context();
    Ok(Json(state.service.update_product(&ctx, request).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    info!("Received delete product request: {}", id);

    let ctx = state.request_context();
    Ok(Json(state.service.delete_product(&ctx, &id).await?))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ProductPage>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.search_products(&ctx, &filter).await?))
}

pub async fn recommendations(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.recommendations(&ctx).await?))
}

pub async fn product_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(window): Query<ReviewWindow>,
) -> Result<Json<ReviewPage>, ApiError> {
    let ctx = state.request_context();
    let page = state
        .service
        .list_product_reviews(&ctx, &id, window.offset, window.limit)
        .await?;
    Ok(Json(page))
}
