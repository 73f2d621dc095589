use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::reviews;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub rating: i16,
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rating: i16,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<reviews::Model> for ReviewResponse {
    fn from(row: reviews::Model) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            rating: row.rating,
            text: row.text,
            created_at: row.created_at.with_timezone(&Utc),
            updated_at: row.updated_at.with_timezone(&Utc),
        }
    }
}
