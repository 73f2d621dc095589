use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::sellers::SellerBrief;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartUpdateRequest {
    pub slug: String,
    pub quantity: i32,
}

/// What a cart or order line shows about its product.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSnapshot {
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub image: String,
    pub seller: Option<SellerBrief>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub quantity: i32,
    pub total: i64,
    pub product: ProductSnapshot,
    pub created_at: DateTime<Utc>,
}
