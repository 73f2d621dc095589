use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::sellers;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SellerApplyRequest {
    pub business_name: String,
    pub website_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub website_url: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<sellers::Model> for SellerResponse {
    fn from(row: sellers::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            business_name: row.business_name,
            slug: row.slug,
            website_url: row.website_url,
            is_approved: row.is_approved,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

/// Storefront identity attached to product and cart payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerBrief {
    pub business_name: String,
    pub slug: String,
    pub avatar: Option<String>,
}
