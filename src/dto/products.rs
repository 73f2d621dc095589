use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::sellers::SellerBrief;
use crate::entity::{categories, products};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<categories::Model> for CategoryResponse {
    fn from(row: categories::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            image: row.image,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductCreateRequest {
    pub name: String,
    pub description: String,
    pub category_slug: String,
    pub price_current: i64,
    pub stock: Option<i32>,
    pub image1: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_slug: Option<String>,
    pub price_current: Option<i64>,
    pub stock: Option<i32>,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub seller_id: Option<Uuid>,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_old: Option<i64>,
    pub price_current: i64,
    pub stock: i32,
    pub image1: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for ProductResponse {
    fn from(row: products::Model) -> Self {
        Self {
            id: row.id,
            seller_id: row.seller_id,
            category_id: row.category_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price_old: row.price_old,
            price_current: row.price_current,
            stock: row.stock,
            image1: row.image1,
            image2: row.image2,
            image3: row.image3,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    pub product: ProductResponse,
    pub category: CategoryResponse,
    pub seller: Option<SellerBrief>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryProductsResponse {
    pub category: CategoryResponse,
    pub products: Vec<ProductResponse>,
}
