pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use auth_feature::TokenService;
use axum::Router;
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
}

/// Build the API router with the given state
pub fn build_router(state: AppState) -> Router {
    routes::router(state)
}
