use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::orders::{OrderDetailResponse, OrderSummaryResponse},
    dto::products::{ProductCreateRequest, ProductResponse, ProductUpdateRequest},
    dto::sellers::{SellerApplyRequest, SellerResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::seller_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(apply))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{slug}",
            axum::routing::put(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders))
        .route("/orders/{tx_ref}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/sellers",
    request_body = SellerApplyRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<SellerResponse>),
        (status = 200, description = "Application updated", body = ApiResponse<SellerResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SellerApplyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SellerResponse>>)> {
    let (status, resp) = seller_service::apply(&state, &user, payload).await?;
    Ok((status, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/sellers/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Own active products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 403, description = "Access is denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<ProductResponse>>>> {
    let resp = seller_service::list_products(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sellers/products",
    request_body = ProductCreateRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 403, description = "Access is denied"),
        (status = 404, description = "Category does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductCreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    let resp = seller_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/sellers/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body = ProductUpdateRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<ProductUpdateRequest>,
) -> AppResult<Json<ApiResponse<ProductResponse>>> {
    let resp = seller_service::update_product(&state, &user, &slug, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sellers/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product soft-deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Product does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = seller_service::delete_product(&state, &user, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sellers/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders containing this seller's products", body = ApiResponse<Vec<OrderSummaryResponse>>),
        (status = 403, description = "Access is denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<OrderSummaryResponse>>>> {
    let resp = seller_service::list_orders(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sellers/orders/{tx_ref}",
    params(
        ("tx_ref" = String, Path, description = "Order reference code")
    ),
    responses(
        (status = 200, description = "Order restricted to own lines", body = ApiResponse<OrderDetailResponse>),
        (status = 404, description = "Order does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tx_ref): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetailResponse>>> {
    let resp = seller_service::get_order(&state, &user, &tx_ref).await?;
    Ok(Json(resp))
}
