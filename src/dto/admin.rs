use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    pub approve: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderStatusRequest {
    pub delivery_status: Option<String>,
    pub payment_status: Option<String>,
}
