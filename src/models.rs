use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const ACCOUNT_TYPE_BUYER: &str = "BUYER";
pub const ACCOUNT_TYPE_SELLER: &str = "SELLER";

/// Claim groups carried in JWTs.
pub const GROUP_ADMIN: &str = "admin";
pub const GROUP_USER: &str = "user";

pub const DELIVERY_STATUSES: [&str; 5] = ["PENDING", "PACKING", "SHIPPING", "ARRIVED", "DELIVERED"];
pub const PAYMENT_STATUSES: [&str; 4] = ["PENDING", "SUCCESSFUL", "CANCELLED", "FAILED"];

/// Full account row, fetched over raw sqlx on the auth path. Never serialized
/// directly; response shapes live in the dto module.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub account_type: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
