use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::cart::ProductSnapshot;
use crate::entity::orders;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingSnapshot {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

impl From<&orders::Model> for ShippingSnapshot {
    fn from(row: &orders::Model) -> Self {
        Self {
            full_name: row.full_name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            address: row.address.clone(),
            city: row.city.clone(),
            country: row.country.clone(),
            zipcode: row.zipcode.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub total: i64,
    pub product: ProductSnapshot,
}

/// Full aggregate for one order: buyer identity, shipping snapshot, lines and
/// totals recomputed from current product prices.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub tx_ref: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub delivery_status: String,
    pub payment_status: String,
    pub shipping_details: ShippingSnapshot,
    pub items: Vec<OrderItemDetail>,
    pub subtotal: i64,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub tx_ref: String,
    pub delivery_status: String,
    pub payment_status: String,
    pub subtotal: i64,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}
