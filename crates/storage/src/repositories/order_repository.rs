use std::sync::Arc;

use async_trait::async_trait;
use domain::commands::order_commands::{CreateOrderResponse, ListUserOrdersRequest, OrderPage};
use domain::Order;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::{from_document, require, to_document};
use crate::context::CallContext;
use crate::document::{DocumentCollection, Filter, FindOptions, SortOrder};
use crate::error::{Result, StorageError};
use crate::pagination::Page;
use crate::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    purchase_date: String,
    quantity: i64,
    price: f64,
}

impl From<&Order> for OrderDocument {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            user_id: order.user_id.clone(),
            purchase_date: timestamp::format(order.purchase_date),
            quantity: order.quantity,
            price: order.price,
        }
    }
}

fn decode(operation: &'static str, document: Document) -> Result<Order> {
    let stored: OrderDocument = from_document(operation, document)?;
    Ok(Order {
        purchase_date: timestamp::parse_required("purchase_date", &stored.purchase_date)
            .map_err(|e| StorageError::decode(operation, e))?,
        id: stored.id,
        user_id: stored.user_id,
        quantity: stored.quantity,
        price: stored.price,
    })
}

/// Confirmed purchases. Orders are written once and never changed.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, ctx: &CallContext, order: Order) -> Result<CreateOrderResponse>;

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Order>;

    async fn list_by_user(&self, ctx: &CallContext, request: &ListUserOrdersRequest) -> Result<OrderPage>;
}

pub struct DocumentOrderRepository {
    orders: Arc<dyn DocumentCollection>,
}

impl DocumentOrderRepository {
    pub fn new(orders: Arc<dyn DocumentCollection>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderRepository for DocumentOrderRepository {
    async fn create(&self, ctx: &CallContext, order: Order) -> Result<CreateOrderResponse> {
        order.validate()?;

        let document = to_document("order.create", &OrderDocument::from(&order))?;
        ctx.run("order.create", self.orders.insert_one(document)).await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            quantity = order.quantity,
            "Order recorded"
        );
        Ok(CreateOrderResponse { product_id: order.id })
    }

    async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<Order> {
        require("order id", id)?;

        match ctx.run("order.get_by_id", self.orders.find_one(&Filter::id(id))).await? {
            Some(document) => decode("order.get_by_id", document),
            None => Err(StorageError::not_found("order", id)),
        }
    }

    async fn list_by_user(&self, ctx: &CallContext, request: &ListUserOrdersRequest) -> Result<OrderPage> {
        require("user id", &request.user_id)?;
        let page = Page::resolve(request.page, request.limit)?;

        let filter = Filter::eq("user_id", request.user_id.as_str());
        let options = FindOptions {
            sort: vec![
                ("purchase_date".to_string(), SortOrder::Descending),
                ("_id".to_string(), SortOrder::Ascending),
            ],
            skip: page.skip(),
            limit: Some(page.limit as u64),
        };

        let total = ctx.run("order.list_by_user", self.orders.count(&filter)).await?;
        let documents = ctx
            .run("order.list_by_user", self.orders.find(&filter, &options))
            .await?;

        let orders = documents
            .into_iter()
            .map(|d| decode("order.list_by_user", d))
            .collect::<Result<Vec<_>>>()?;

        debug!(user_id = %request.user_id, total, "Listed orders");
        Ok(OrderPage {
            orders,
            total: total as i64,
            limit: page.limit,
            page: page.page,
        })
    }
}
