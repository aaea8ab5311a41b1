use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::commands::review_commands::{
    CreateReviewRequest, DeleteReviewRequest, ListReviewsRequest, ReviewPage, UpdateReviewRequest,
};
use domain::commands::MutationResponse;
use domain::Review;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Identifies the author and product a review must belong to
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewOwner {
    pub user_id: String,
    pub product_id: String,
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    info!("Received create review request for product: {}", request.product_id);

    let ctx = state.request_context();
    let review = state.service.create_review(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Review>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.get_review(&ctx, &id).await?))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(request): Query<ListReviewsRequest>,
) -> Result<Json<ReviewPage>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.list_reviews(&ctx, &request).await?))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    info!("Received update review request: {}", id);
    request.id = id;

    let ctx = state.request_context();
    Ok(Json(state.service.update_review(&ctx, request).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(owner): Query<ReviewOwner>,
) -> Result<Json<MutationResponse>, ApiError> {
    info!("Received delete review request: {}", id);

    let request = DeleteReviewRequest {
        id,
        user_id: owner.user_id,
        product_id: owner.product_id,
    };
    let ctx = state.request_context();
    Ok(Json(state.service.delete_review(&ctx, request).await?))
}
