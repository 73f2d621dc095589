use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};

use crate::{
    dto::admin::{ApprovalRequest, OrderStatusRequest},
    dto::orders::{OrderDetailResponse, OrderSummaryResponse},
    dto::sellers::SellerResponse,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{OrderListQuery, SellerListQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list_sellers))
        .route("/sellers/{slug}/approval", patch(set_seller_approval))
        .route("/orders", get(list_all_orders))
        .route("/orders/{tx_ref}/status", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/sellers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("approved" = Option<bool>, Query, description = "Filter by approval state")
    ),
    responses(
        (status = 200, description = "All sellers", body = ApiResponse<Vec<SellerResponse>>),
        (status = 403, description = "Access is denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_sellers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SellerListQuery>,
) -> AppResult<Json<ApiResponse<Vec<SellerResponse>>>> {
    let resp = admin_service::list_sellers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/sellers/{slug}/approval",
    params(
        ("slug" = String, Path, description = "Seller slug")
    ),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Approval flag set", body = ApiResponse<SellerResponse>),
        (status = 404, description = "Seller does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_seller_approval(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<ApiResponse<SellerResponse>>> {
    let resp =
        admin_service::set_seller_approval(&state, &user, &slug, payload.approve).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Delivery status filter"),
        ("sort_order" = Option<String>, Query, description = "asc | desc by creation time, default desc")
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<Vec<OrderSummaryResponse>>),
        (status = 403, description = "Access is denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderSummaryResponse>>>> {
    let resp = admin_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{tx_ref}/status",
    params(
        ("tx_ref" = String, Path, description = "Order reference code")
    ),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderDetailResponse>),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Order does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tx_ref): Path<String>,
    Json(payload): Json<OrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderDetailResponse>>> {
    let resp = admin_service::update_order_status(
        &state,
        &user,
        &tx_ref,
        payload.delivery_status,
        payload.payment_status,
    )
    .await?;
    Ok(Json(resp))
}
