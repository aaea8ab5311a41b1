use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::commands::order_commands::{CreateOrderResponse, ListUserOrdersRequest, OrderPage};
use domain::Order;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderPaging {
    pub page: i64,
    pub limit: i64,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    info!("Received create order request: {}", order.id);

    let ctx = state.request_context();
    let response = state.service.create_order(&ctx, order).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let ctx = state.request_context();
    Ok(Json(state.service.get_order(&ctx, &id).await?))
}

pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(paging): Query<OrderPaging>,
) -> Result<Json<OrderPage>, ApiError> {
    let request = ListUserOrdersRequest {
        user_id,
        page: paging.page,
        limit: paging.limit,
    };
    let ctx = state.request_context();
    Ok(Json(state.service.list_user_orders(&ctx, &request).await?))
}
