use domain::{
    NewTodo, SortBy, SortOrder, Todo, TodoFilter, TodoPatch, TodoPriority, TodoRepository,
    TodoStatus,
};
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::TodoFeatureError;

/// Input for creating a new todo. Status is not accepted here; every todo
/// starts out pending.
pub struct CreateTodoInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<OffsetDateTime>,
    pub tags: Option<Vec<String>>,
}

/// Input for updating a todo. Omitted fields keep their current value;
/// `due_date` is tri-state so an explicit null clears the date.
#[derive(Default)]
pub struct UpdateTodoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub tags: Option<Vec<String>>,
}

/// Listing parameters: page/filter/sort
#[derive(Debug)]
pub struct ListTodosQuery {
    pub page: u64,
    pub limit: u64,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for ListTodosQuery {
    fn default() -> Self {
        ListTodosQuery {
            page: 1,
            limit: 10,
            status: None,
            priority: None,
            search: None,
            sort_by: SortBy::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Pagination metadata returned alongside a page of todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

/// One page of todos plus pagination metadata
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub pagination: Pagination,
}

/// Todo counts grouped by status
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

/// Todo counts grouped by priority
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

/// Aggregate statistics over all of a user's todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStatistics {
    pub total: u64,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub completed_percentage: u64,
}

/// Service for todo workflows. Every operation is scoped to the calling
/// user; a todo owned by someone else is indistinguishable from a missing
/// one.
pub struct TodoService;

impl TodoService {
    /// Create a new todo for a user
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: CreateTodoInput,
    ) -> Result<Todo, TodoFeatureError> {
        let todo = TodoRepository::create(
            pool,
            NewTodo {
                user_id,
                title: input.title,
                description: input.description,
                priority: input.priority.unwrap_or(TodoPriority::Medium),
                due_date: input.due_date,
                tags: input.tags.unwrap_or_default(),
            },
        )
        .await?;

        info!(todo_id = %todo.id, user_id = %user_id, "todo created");

        Ok(todo)
    }

    /// List a page of the user's todos matching the query
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: ListTodosQuery,
    ) -> Result<TodoPage, TodoFeatureError> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, i64::MAX as u64);
        // Caller-controlled page and limit must not overflow; a page past
        // the end of the data just comes back empty.
        let offset = page
            .saturating_sub(1)
            .saturating_mul(limit)
            .min(i64::MAX as u64);

        let filter = TodoFilter {
            user_id,
            status: query.status,
            priority: query.priority,
            search: query.search,
        };

        let (todos, total) = TodoRepository::list(
            pool,
            &filter,
            query.sort_by,
            query.sort_order,
            limit,
            offset,
        )
        .await?;

        Ok(TodoPage {
            todos,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        })
    }

    /// Get one of the user's todos by ID
    pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Todo, TodoFeatureError> {
        TodoRepository::find_by_id(pool, id, user_id)
            .await?
            .ok_or(TodoFeatureError::NotFound(id))
    }

    /// Partially update one of the user's todos. A transition into
    /// `completed` stamps `completed_at`; a transition out clears it; staying
    /// in `completed` leaves it untouched.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        input: UpdateTodoInput,
    ) -> Result<Todo, TodoFeatureError> {
        let existing = Self::get(pool, user_id, id).await?;

        let mut patch = TodoPatch {
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            tags: input.tags,
            completed_at: None,
        };

        if let Some(new_status) = input.status {
            let was_completed = existing.status == TodoStatus::Completed;
            let now_completed = new_status == TodoStatus::Completed;
            if now_completed && !was_completed {
                patch.completed_at = Some(Some(OffsetDateTime::now_utc()));
            } else if !now_completed && was_completed {
                patch.completed_at = Some(None);
            }
        }

        let todo = TodoRepository::update(pool, id, user_id, patch)
            .await?
            .ok_or(TodoFeatureError::NotFound(id))?;

        info!(todo_id = %id, user_id = %user_id, "todo updated");

        Ok(todo)
    }

    /// Delete one of the user's todos
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), TodoFeatureError> {
        if !TodoRepository::delete(pool, id, user_id).await? {
            return Err(TodoFeatureError::NotFound(id));
        }

        info!(todo_id = %id, user_id = %user_id, "todo deleted");

        Ok(())
    }

    /// Delete every listed todo the user owns, returning the count actually
    /// deleted. Ids that are missing or owned by someone else are skipped
    /// silently.
    pub async fn bulk_delete(
        pool: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, TodoFeatureError> {
        if ids.is_empty() {
            return Err(TodoFeatureError::EmptyIdList);
        }

        let deleted = TodoRepository::delete_many(pool, ids, user_id).await?;

        info!(count = deleted, user_id = %user_id, "bulk delete");

        Ok(deleted)
    }

    /// Aggregate statistics over all of the user's todos
    pub async fn statistics(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<TodoStatistics, TodoFeatureError> {
        let rows = TodoRepository::status_priority(pool, user_id).await?;

        let total = rows.len() as u64;
        let mut by_status = StatusCounts::default();
        let mut by_priority = PriorityCounts::default();

        for (status, priority) in rows {
            match status {
                TodoStatus::Pending => by_status.pending += 1,
                TodoStatus::InProgress => by_status.in_progress += 1,
                TodoStatus::Completed => by_status.completed += 1,
            }
            match priority {
                TodoPriority::Low => by_priority.low += 1,
                TodoPriority::Medium => by_priority.medium += 1,
                TodoPriority::High => by_priority.high += 1,
            }
        }

        let completed_percentage = if total > 0 {
            ((by_status.completed as f64 / total as f64) * 100.0).round() as u64
        } else {
            0
        };

        Ok(TodoStatistics {
            total,
            by_status,
            by_priority,
            completed_percentage,
        })
    }
}
