use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CartLine, Category};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub session_id: String,
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub category: Category,
    pub image: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub session_id: String,
    pub quantity: i32,
}

/// Items plus the derived totals; totals are recomputed from the lines on
/// every response, never stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_amount: i64,
    pub total_items: i32,
}

impl CartView {
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total_amount = items.iter().map(|l| l.price * l.quantity as i64).sum();
        let total_items = items.iter().map(|l| l.quantity).sum();
        Self {
            items,
            total_amount,
            total_items,
        }
    }
}
