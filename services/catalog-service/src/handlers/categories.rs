use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::commands::category_commands::{
    CategoryPage, CreateCategoryRequest, CreateCategoryResponse, ListCategoriesRequest,
    UpdateCategoryRequest,
};
use domain::commands::MutationResponse;
use domain::Category;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CreateCategoryResponse>), ApiError> {
    info!("Received create category request: {}", request.name);

    let ctx = state.request_context();
    let response = state.service.create_category(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.get_category(&ctx, &id).await?))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(request): Query<ListCategoriesRequest>,
) -> Result<Json<CategoryPage>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.list_categories(&ctx, &request).await?))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    info!("Received update category request: {}", id);
    request.id = id;

    let ctx = state.request_context();
    Ok(Json(state.service.update_category(&ctx, request).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    info!("Received delete category request: {}", id);

    let ctx = state.request_context();
    Ok(Json(state.service.delete_category(&ctx, &id).await?))
}
