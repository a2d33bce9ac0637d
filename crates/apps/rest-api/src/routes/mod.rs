pub mod auth;
pub mod todos;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::AppState;

/// Build the full API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/auth/profile",
            get(auth::profile).put(auth::update_profile),
        )
        .route("/api/todos", get(todos::list).post(todos::create))
        .route("/api/todos/statistics", get(todos::statistics))
        .route("/api/todos/bulk-delete", post(todos::bulk_delete))
        .route(
            "/api/todos/{id}",
            get(todos::get_one).put(todos::update).delete(todos::remove),
        )
        .route("/health", get(health))
        .with_state(state)
}

/// Health check handler
async fn health() -> &'static str {
    "OK"
}

/// Wrap a payload in the `{success: true, data}` envelope
pub(crate) fn success(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Wrap a human-readable outcome in the `{success: true, message}` envelope
pub(crate) fn success_message(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": message.into() }))
}
