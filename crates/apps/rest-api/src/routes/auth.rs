use auth_feature::{
    AuthFeatureError, AuthService, AuthSession, LoginInput, RegisterInput, UpdateProfileInput,
    UserProfile,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{success, success_message};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::validation;

const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Public user representation on the wire
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserProfile> for UserBody {
    fn from(profile: UserProfile) -> Self {
        UserBody {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            last_login: profile.last_login_at,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// The refresh token travels in an http-only cookie, never in the body
fn refresh_cookie(token: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .path("/")
        .build()
}

fn session_payload(session: AuthSession) -> serde_json::Value {
    json!({
        "user": UserBody::from(session.user),
        "accessToken": session.tokens.access_token,
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validation::validate_register(&body).map_err(ApiError::Validation)?;

    let session = AuthService::register(
        &state.pool,
        &state.tokens,
        RegisterInput {
            username: input.username,
            email: input.email,
            password: input.password,
        },
    )
    .await
    .map_err(|err| match err {
        AuthFeatureError::EmailExists(_) => {
            ApiError::message(StatusCode::CONFLICT, "User already exists")
        }
        other => other.into(),
    })?;

    let jar = jar.add(refresh_cookie(
        session.tokens.refresh_token.clone(),
        state.tokens.refresh_ttl(),
    ));

    Ok((
        StatusCode::CREATED,
        jar,
        success(session_payload(session)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validation::validate_login(&body).map_err(ApiError::Validation)?;

    let session = AuthService::login(
        &state.pool,
        &state.tokens,
        LoginInput {
            email: input.email,
            password: input.password,
        },
    )
    .await?;

    let jar = jar.add(refresh_cookie(
        session.tokens.refresh_token.clone(),
        state.tokens.refresh_ttl(),
    ));

    Ok((jar, success(session_payload(session))))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Refresh token required"))?;

    let session = AuthService::refresh(&state.pool, &state.tokens, &token)
        .await
        .map_err(|err| match err {
            // The user behind a still-valid token may be gone; that is an
            // auth failure, not a lookup failure.
            AuthFeatureError::UserNotFound(_) => ApiError::unauthorized("User not found"),
            other => other.into(),
        })?;

    let jar = jar.add(refresh_cookie(
        session.tokens.refresh_token.clone(),
        state.tokens.refresh_ttl(),
    ));

    Ok((
        jar,
        success(json!({ "accessToken": session.tokens.access_token })),
    ))
}

/// POST /api/auth/logout
///
/// Stateless: only the cookie is discarded, nothing is revoked server-side.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((REFRESH_COOKIE, "")).path("/").build());

    (jar, success_message("Logged out successfully"))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = AuthService::profile(&state.pool, user_id).await?;

    Ok(success(json!({ "user": UserBody::from(profile) })))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<UpdateProfileBody>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_update_profile(&body).map_err(ApiError::Validation)?;

    let profile = AuthService::update_profile(
        &state.pool,
        user_id,
        UpdateProfileInput {
            username: body.username,
            email: body.email,
        },
    )
    .await?;

    Ok(success(json!({ "user": UserBody::from(profile) })))
}
