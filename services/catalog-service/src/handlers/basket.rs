use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::commands::basket_commands::{AddToBasketRequest, AddToBasketResponse, BasketResponse};
use domain::commands::MutationResponse;
use domain::BasketEntry;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn add_to_basket(
    State(state): State<AppState>,
    Json(request): Json<AddToBasketRequest>,
) -> Result<(StatusCode, Json<AddToBasketResponse>), ApiError> {
    info!(
        "Received add to basket request: user {} product {}",
        request.user_id, request.product_id
    );

    let ctx = state.request_context();
    let response = state.service.add_to_basket(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_basket(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BasketResponse>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.get_basket(&ctx, &user_id).await?))
}

pub async fn get_basket_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<BasketEntry>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(
        state
            .service
            .get_basket_item(&ctx, &user_id, &product_id)
            .await?,
    ))
}

pub async fn remove_from_basket(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<MutationResponse>, ApiError> {
    info!("Received remove from basket request: user {} product {}", user_id, product_id);

    let ctx = state.request_context();
    Ok(Json(
        state
            .service
            .remove_from_basket(&ctx, &user_id, &product_id)
            .await?,
    ))
}
