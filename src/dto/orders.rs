use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, ShippingAddress};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub session_id: String,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<String>,
    /// Display hint only; the server reprices the cart and ignores this
    /// beyond a mismatch warning in the logs.
    pub client_total: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Owner info attached to admin and detail views.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub user: OrderUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderEntry {
    pub order: Order,
    pub user: OrderUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderList {
    pub items: Vec<AdminOrderEntry>,
}
