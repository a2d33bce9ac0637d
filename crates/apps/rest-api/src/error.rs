use auth_feature::AuthFeatureError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use todo_feature::TodoFeatureError;
use tracing::error;

/// A single validation failure, addressed to one request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// HTTP-facing error. Internal detail (SQL, stack traces) never crosses
/// this boundary; clients get a stable message or field list only.
#[derive(Debug)]
pub enum ApiError {
    Message(StatusCode, String),
    Validation(Vec<FieldError>),
}

impl ApiError {
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Message(status, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Message(StatusCode::UNAUTHORIZED, message.into())
    }

    fn internal() -> Self {
        ApiError::Message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Message(status, message) => (
                status,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "errors": errors })),
            )
                .into_response(),
        }
    }
}

impl From<AuthFeatureError> for ApiError {
    fn from(err: AuthFeatureError) -> Self {
        match err {
            AuthFeatureError::EmailExists(_) => {
                ApiError::message(StatusCode::CONFLICT, "Email already in use")
            }
            AuthFeatureError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthFeatureError::InvalidToken => ApiError::unauthorized("Invalid refresh token"),
            AuthFeatureError::ExpiredToken => ApiError::unauthorized("Refresh token expired"),
            AuthFeatureError::UserNotFound(_) => {
                ApiError::message(StatusCode::NOT_FOUND, "User not found")
            }
            AuthFeatureError::Domain(err) => {
                error!(error = %err, "auth workflow failed");
                ApiError::internal()
            }
            AuthFeatureError::PasswordHash(err) => {
                error!(error = %err, "password hashing failed");
                ApiError::internal()
            }
        }
    }
}

impl From<TodoFeatureError> for ApiError {
    fn from(err: TodoFeatureError) -> Self {
        match err {
            TodoFeatureError::NotFound(_) => {
                ApiError::message(StatusCode::NOT_FOUND, "Todo not found")
            }
            TodoFeatureError::EmptyIdList => {
                ApiError::message(StatusCode::BAD_REQUEST, "Array of todo IDs required")
            }
            TodoFeatureError::Domain(err) => {
                error!(error = %err, "todo workflow failed");
                ApiError::internal()
            }
        }
    }
}
