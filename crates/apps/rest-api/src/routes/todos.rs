use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use todo_feature::{CreateTodoInput, TodoService, UpdateTodoInput};
use uuid::Uuid;

use super::{success, success_message};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::validation;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Tri-state: absent leaves the date alone, an explicit null clears it
    #[serde(default, deserialize_with = "rfc3339_double_option")]
    pub due_date: Option<Option<OffsetDateTime>>,
    pub tags: Option<Vec<String>>,
}

/// Distinguish a missing `dueDate` key (outer `None`, via `default`) from an
/// explicit `"dueDate": null` (inner `None`)
fn rfc3339_double_option<'de, D>(
    deserializer: D,
) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Option<Vec<Uuid>>,
}

/// Todo representation on the wire
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoBody {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: &'static str,
    pub priority: &'static str,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<domain::Todo> for TodoBody {
    fn from(todo: domain::Todo) -> Self {
        TodoBody {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            status: todo.status.as_str(),
            priority: todo.priority.as_str(),
            due_date: todo.due_date,
            completed_at: todo.completed_at,
            tags: todo.tags,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// GET /api/todos
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(params): ApiQuery<ListTodosParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = validation::validate_list(&params).map_err(ApiError::Validation)?;

    let page = TodoService::list(&state.pool, user_id, query).await?;

    let todos: Vec<TodoBody> = page.todos.into_iter().map(Into::into).collect();

    Ok(success(json!({
        "todos": todos,
        "pagination": page.pagination,
    })))
}

/// POST /api/todos
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateTodoBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validation::validate_create_todo(&body).map_err(ApiError::Validation)?;

    let todo = TodoService::create(
        &state.pool,
        user_id,
        CreateTodoInput {
            title: input.title,
            description: input.description,
            priority: input.priority,
            due_date: input.due_date,
            tags: input.tags,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        success(json!({ "todo": TodoBody::from(todo) })),
    ))
}

/// GET /api/todos/{id}
pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = TodoService::get(&state.pool, user_id, id).await?;

    Ok(success(json!({ "todo": TodoBody::from(todo) })))
}

/// PUT /api/todos/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateTodoBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validation::validate_update_todo(&body).map_err(ApiError::Validation)?;

    let todo = TodoService::update(
        &state.pool,
        user_id,
        id,
        UpdateTodoInput {
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            tags: input.tags,
        },
    )
    .await?;

    Ok(success(json!({ "todo": TodoBody::from(todo) })))
}

/// DELETE /api/todos/{id}
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    TodoService::delete(&state.pool, user_id, id).await?;

    Ok(success_message("Todo deleted successfully"))
}

/// POST /api/todos/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<BulkDeleteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = body.ids.unwrap_or_default();

    let deleted = TodoService::bulk_delete(&state.pool, user_id, &ids).await?;

    Ok(success_message(format!(
        "{deleted} todos deleted successfully"
    )))
}

/// GET /api/todos/statistics
pub async fn statistics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = TodoService::statistics(&state.pool, user_id).await?;

    Ok(success(serde_json::to_value(stats).unwrap_or_default()))
}
