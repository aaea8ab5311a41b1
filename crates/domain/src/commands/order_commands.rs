use serde::{Deserialize, Serialize};

use crate::models::Order;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderResponse {
    pub product_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUserOrdersRequest {
    pub user_id: String,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
    pub limit: i64,
    pub page: i64,
}
