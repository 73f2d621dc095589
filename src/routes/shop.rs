use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::cart::{CartLineResponse, CartUpdateRequest},
    dto::orders::{CheckoutRequest, OrderDetailResponse},
    dto::products::{
        CategoryProductsResponse, CategoryRequest, CategoryResponse, ProductDetailResponse,
        ProductResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery},
    routes::reviews,
    services::{cart_service, catalog_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{slug}", get(category_products))
        .route("/products", get(list_products))
        .route("/products/{slug}", get(product_detail))
        .nest("/products/{slug}/reviews", reviews::router())
        .route("/sellers/{slug}", get(seller_products))
        .route("/cart", get(cart_list).post(cart_update))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/shop/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<Vec<CategoryResponse>>)
    ),
    tag = "Shop"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CategoryResponse>>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Duplicate or empty name"),
        (status = 403, description = "Access is denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CategoryResponse>>)> {
    let resp = catalog_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/shop/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category with its active products", body = ApiResponse<CategoryProductsResponse>),
        (status = 404, description = "Category does not exist!")
    ),
    tag = "Shop"
)]
pub async fn category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryProductsResponse>>> {
    let resp = catalog_service::products_by_category(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shop/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Substring match on name or description"),
        ("min_price" = Option<String>, Query, description = "Lower price bound, integer minor units"),
        ("max_price" = Option<String>, Query, description = "Upper price bound, must exceed min"),
        ("sort_by" = Option<String>, Query, description = "created_at | price | name"),
        ("sort_order" = Option<String>, Query, description = "asc | desc, default desc")
    ),
    responses(
        (status = 200, description = "Active products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 400, description = "Bad price bounds")
    ),
    tag = "Shop"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<ProductResponse>>>> {
    let resp = catalog_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shop/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product with category and seller", body = ApiResponse<ProductDetailResponse>),
        (status = 404, description = "Product does not exist!")
    ),
    tag = "Shop"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetailResponse>>> {
    let resp = catalog_service::product_detail(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shop/sellers/{slug}",
    params(
        ("slug" = String, Path, description = "Seller slug")
    ),
    responses(
        (status = 200, description = "Active products of an approved seller", body = ApiResponse<Vec<ProductResponse>>),
        (status = 404, description = "Seller does not exist!")
    ),
    tag = "Shop"
)]
pub async fn seller_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<ProductResponse>>>> {
    let resp = catalog_service::products_by_seller(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shop/cart",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Cart lines with product snapshots", body = ApiResponse<Vec<CartLineResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<CartLineResponse>>>> {
    let resp = cart_service::list_cart(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/cart",
    request_body = CartUpdateRequest,
    responses(
        (status = 201, description = "Item Added To Cart", body = ApiResponse<CartLineResponse>),
        (status = 200, description = "Item Updated In Cart / Item Removed From Cart", body = ApiResponse<CartLineResponse>),
        (status = 404, description = "No Product with that slug")
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn cart_update(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CartUpdateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartLineResponse>>)> {
    let (status, resp) = cart_service::toggle_cart_item(&state, &user, payload).await?;
    Ok((status, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/shop/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout Successful", body = ApiResponse<OrderDetailResponse>),
        (status = 404, description = "No Items in Cart / No shipping address with that ID")
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderDetailResponse>>> {
    let resp = order_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}
