use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::shipping_addresses;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingAddressRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingAddressResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
    pub created_at: DateTime<Utc>,
}

impl From<shipping_addresses::Model> for ShippingAddressResponse {
    fn from(row: shipping_addresses::Model) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            country: row.country,
            zipcode: row.zipcode,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}
