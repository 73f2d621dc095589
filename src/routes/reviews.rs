use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::reviews::{ReviewRequest, ReviewResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::ReviewQuery,
    services::review_service,
    state::AppState,
};

/// Nested under `/api/shop/products/{slug}`, so every handler receives the
/// product slug as its leading path parameter.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(upsert_review))
        .route("/{id}", axum::routing::delete(delete_review))
}

#[utoipa::path(
    get,
    path = "/api/shop/products/{slug}/reviews",
    params(
        ("slug" = String, Path, description = "Product slug"),
        ("sort" = Option<String>, Query, description = "created_at | rating, `-` prefix for descending")
    ),
    responses(
        (status = 200, description = "Own reviews of the product", body = ApiResponse<Vec<ReviewResponse>>),
        (status = 404, description = "No Product with that slug")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<ApiResponse<Vec<ReviewResponse>>>> {
    let resp = review_service::list(&state, &user, &slug, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/products/{slug}/reviews",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Created Review", body = ApiResponse<ReviewResponse>),
        (status = 200, description = "Updated Review", body = ApiResponse<ReviewResponse>),
        (status = 403, description = "Sellers cannot review their own product"),
        (status = 404, description = "No Product with that slug")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn upsert_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReviewResponse>>)> {
    let (status, resp) = review_service::upsert(&state, &user, &slug, payload).await?;
    Ok((status, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/shop/products/{slug}/reviews/{id}",
    params(
        ("slug" = String, Path, description = "Product slug"),
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Success delete review", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Review does not exist!")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path((slug, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete(&state, &user, &slug, id).await?;
    Ok(Json(resp))
}
