use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod admin;
pub mod doc;
pub mod health;
pub mod params;
pub mod profile;
pub mod reviews;
pub mod sellers;
pub mod shop;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/profile", profile::router())
        .nest("/sellers", sellers::router())
        .nest("/shop", shop::router())
        .nest("/admin", admin::router())
}
