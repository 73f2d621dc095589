use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::auth::UserResponse,
    dto::orders::{OrderDetailResponse, OrderSummaryResponse},
    dto::profile::{ShippingAddressRequest, ShippingAddressResponse, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile).delete(deactivate))
        .route(
            "/shipping_addresses",
            get(list_addresses).post(create_address),
        )
        .route(
            "/shipping_addresses/detail/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/orders", get(list_orders))
        .route("/orders/{tx_ref}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<UserResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let resp = profile_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/profile",
    responses(
        (status = 200, description = "Account deactivated", body = ApiResponse<serde_json::Value>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn deactivate(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = profile_service::deactivate_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/shipping_addresses",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Own shipping addresses", body = ApiResponse<Vec<ShippingAddressResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<ShippingAddressResponse>>>> {
    let resp = profile_service::list_addresses(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/profile/shipping_addresses",
    request_body = ShippingAddressRequest,
    responses(
        (status = 201, description = "Shipping address stored", body = ApiResponse<ShippingAddressResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ShippingAddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShippingAddressResponse>>)> {
    let resp = profile_service::create_address(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/profile/shipping_addresses/detail/{id}",
    params(
        ("id" = Uuid, Path, description = "Shipping address ID")
    ),
    responses(
        (status = 200, description = "One shipping address", body = ApiResponse<ShippingAddressResponse>),
        (status = 404, description = "Shipping Address does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn get_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShippingAddressResponse>>> {
    let resp = profile_service::get_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile/shipping_addresses/detail/{id}",
    params(
        ("id" = Uuid, Path, description = "Shipping address ID")
    ),
    request_body = ShippingAddressRequest,
    responses(
        (status = 200, description = "Shipping address updated", body = ApiResponse<ShippingAddressResponse>),
        (status = 404, description = "Shipping Address does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<ShippingAddressResponse>>> {
    let resp = profile_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/profile/shipping_addresses/detail/{id}",
    params(
        ("id" = Uuid, Path, description = "Shipping address ID")
    ),
    responses(
        (status = 200, description = "Shipping address deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Shipping Address does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = profile_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Own orders, newest first", body = ApiResponse<Vec<OrderSummaryResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<OrderSummaryResponse>>>> {
    let resp = profile_service::list_orders(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/orders/{tx_ref}",
    params(
        ("tx_ref" = String, Path, description = "Order reference code")
    ),
    responses(
        (status = 200, description = "One order with items", body = ApiResponse<OrderDetailResponse>),
        (status = 404, description = "Order does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tx_ref): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetailResponse>>> {
    let resp = profile_service::get_order(&state, &user, &tx_ref).await?;
    Ok(Json(resp))
}
