//! Shared helpers for driving the router in-process with `tower::oneshot`.

use std::sync::Arc;

use auth_feature::TokenService;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use rest_api::{AppState, build_router};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

pub fn test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        tokens: Arc::new(TokenService::new(
            "test-access-secret",
            "test-refresh-secret",
        )),
    };

    build_router(state)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&bytes).unwrap()
}

/// First `Set-Cookie` header value, e.g. `refreshToken=...; HttpOnly; ...`
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// The `name=value` pair of the refresh cookie, ready for a `Cookie` header
pub fn refresh_cookie_pair(response: &Response<Body>) -> Option<String> {
    set_cookie(response)?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Register a user and return the access token plus the refresh cookie pair
pub async fn register_user(app: &Router, username: &str, email: &str) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": username,
                "email": email,
                "password": "password123",
                "confirmPassword": "password123",
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let cookie = refresh_cookie_pair(&response).unwrap();
    let body = read_json(response).await;
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    (token, cookie)
}

/// Create a todo for the given user and return its id
pub async fn create_todo(app: &Router, token: &str, body: Value) -> String {
    let response = send(app, authed_json_request("POST", "/api/todos", token, body)).await;

    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let body = read_json(response).await;
    body["data"]["todo"]["id"].as_str().unwrap().to_string()
}
