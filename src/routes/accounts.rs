use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{
        AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
        UserResponse,
    },
    error::AppResult,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
        .route("/token/refresh", post(token_refresh))
}

#[utoipa::path(
    post,
    path = "/api/accounts/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid email, weak password or taken email")
    ),
    tag = "Accounts"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let resp = auth_service::register_user(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/accounts/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = ApiResponse<TokenPairResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Accounts"
)]
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPairResponse>>> {
    let resp = auth_service::obtain_token_pair(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/accounts/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Fresh access token", body = ApiResponse<AccessTokenResponse>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "Accounts"
)]
pub async fn token_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AccessTokenResponse>>> {
    let resp = auth_service::refresh_access_token(&state.pool, payload).await?;
    Ok(Json(resp))
}
