use sea_query::extension::postgres::PgExpr;
use sea_query::{Cond, Expr, Iden, Order, PostgresQueryBuilder, Query, SimpleExpr};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::DomainError;

/// Schema definition for the todos table
#[derive(Iden)]
pub enum Todos {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Status,
    Priority,
    DueDate,
    CompletedAt,
    Tags,
    CreatedAt,
    UpdatedAt,
}

const TODO_COLUMNS: [Todos; 11] = [
    Todos::Id,
    Todos::UserId,
    Todos::Title,
    Todos::Description,
    Todos::Status,
    Todos::Priority,
    Todos::DueDate,
    Todos::CompletedAt,
    Todos::Tags,
    Todos::CreatedAt,
    Todos::UpdatedAt,
];

/// Todo status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TodoStatus::Pending),
            "in_progress" => Some(TodoStatus::InProgress),
            "completed" => Some(TodoStatus::Completed),
            _ => None,
        }
    }
}

impl From<TodoStatus> for sea_query::Value {
    fn from(status: TodoStatus) -> Self {
        status.as_str().into()
    }
}

/// Todo priority enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

impl TodoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoPriority::Low => "low",
            TodoPriority::Medium => "medium",
            TodoPriority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TodoPriority::Low),
            "medium" => Some(TodoPriority::Medium),
            "high" => Some(TodoPriority::High),
            _ => None,
        }
    }
}

impl From<TodoPriority> for sea_query::Value {
    fn from(priority: TodoPriority) -> Self {
        priority.as_str().into()
    }
}

/// Raw todo row from database
#[derive(Debug, Clone, FromRow)]
struct TodoRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Todo entity
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub due_date: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            status: TodoStatus::from_str(&row.status).unwrap_or(TodoStatus::Pending),
            priority: TodoPriority::from_str(&row.priority).unwrap_or(TodoPriority::Medium),
            due_date: row.due_date,
            completed_at: row.completed_at,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for inserting a new todo
pub struct NewTodo {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TodoPriority,
    pub due_date: Option<OffsetDateTime>,
    pub tags: Vec<String>,
}

/// Owner-scoped filter for listing todos
pub struct TodoFilter {
    pub user_id: Uuid,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub search: Option<String>,
}

/// Sortable columns for todo listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Partial update for a todo. `due_date` and `completed_at` are tri-state:
/// `None` leaves the column untouched, `Some(None)` clears it,
/// `Some(Some(_))` sets it.
#[derive(Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub tags: Option<Vec<String>>,
    pub completed_at: Option<Option<OffsetDateTime>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.completed_at.is_none()
    }
}

/// Repository for Todo operations. Every read and write is scoped to the
/// owning user except `create`, which attaches the owner itself.
pub struct TodoRepository;

impl TodoRepository {
    /// Create a new todo
    pub async fn create(pool: &PgPool, new_todo: NewTodo) -> Result<Todo, DomainError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::insert()
            .into_table(Todos::Table)
            .columns([
                Todos::Id,
                Todos::UserId,
                Todos::Title,
                Todos::Description,
                Todos::Status,
                Todos::Priority,
                Todos::DueDate,
                Todos::Tags,
                Todos::CreatedAt,
                Todos::UpdatedAt,
            ])
            .values_panic([
                id.into(),
                new_todo.user_id.into(),
                new_todo.title.into(),
                new_todo.description.into(),
                TodoStatus::Pending.into(),
                new_todo.priority.into(),
                new_todo.due_date.into(),
                new_todo.tags.into(),
                now.into(),
                now.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, TodoRow, _>(&sql, values)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Find a todo by ID, scoped to its owner
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Todo>, DomainError> {
        let (sql, values) = Query::select()
            .columns(TODO_COLUMNS)
            .from(Todos::Table)
            .and_where(Expr::col(Todos::Id).eq(id))
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, TodoRow, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List a page of todos matching the filter, plus the total match count
    pub async fn list(
        pool: &PgPool,
        filter: &TodoFilter,
        sort_by: SortBy,
        sort_order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Todo>, u64), DomainError> {
        let condition = Self::filter_condition(filter);

        let (sql, values) = Query::select()
            .expr(Expr::col(Todos::Id).count())
            .from(Todos::Table)
            .cond_where(condition.clone())
            .build_sqlx(PostgresQueryBuilder);

        let (total,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(pool).await?;

        let mut stmt = Query::select();
        stmt.columns(TODO_COLUMNS)
            .from(Todos::Table)
            .cond_where(condition)
            .limit(limit)
            .offset(offset);

        match sort_by {
            // Text-column priority would sort lexicographically; rank it
            // semantically instead.
            SortBy::Priority => {
                stmt.order_by_expr(Self::priority_rank(), sort_order.into());
            }
            SortBy::CreatedAt => {
                stmt.order_by(Todos::CreatedAt, sort_order.into());
            }
            SortBy::UpdatedAt => {
                stmt.order_by(Todos::UpdatedAt, sort_order.into());
            }
            SortBy::DueDate => {
                stmt.order_by(Todos::DueDate, sort_order.into());
            }
            SortBy::Title => {
                stmt.order_by(Todos::Title, sort_order.into());
            }
        }

        let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);

        let rows = sqlx::query_as_with::<_, TodoRow, _>(&sql, values)
            .fetch_all(pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total as u64))
    }

    /// Partially update a todo, scoped to its owner
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, DomainError> {
        if patch.is_empty() {
            return Self::find_by_id(pool, id, user_id).await;
        }

        let now = OffsetDateTime::now_utc();

        let mut stmt = Query::update();
        stmt.table(Todos::Table);
        if let Some(title) = patch.title {
            stmt.value(Todos::Title, title);
        }
        if let Some(description) = patch.description {
            stmt.value(Todos::Description, description);
        }
        if let Some(status) = patch.status {
            stmt.value(Todos::Status, status);
        }
        if let Some(priority) = patch.priority {
            stmt.value(Todos::Priority, priority);
        }
        if let Some(due_date) = patch.due_date {
            stmt.value(Todos::DueDate, due_date);
        }
        if let Some(tags) = patch.tags {
            stmt.value(Todos::Tags, tags);
        }
        if let Some(completed_at) = patch.completed_at {
            stmt.value(Todos::CompletedAt, completed_at);
        }
        stmt.value(Todos::UpdatedAt, now)
            .and_where(Expr::col(Todos::Id).eq(id))
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .returning_all();

        let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, TodoRow, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a todo, scoped to its owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let (sql, values) = Query::delete()
            .from_table(Todos::Table)
            .and_where(Expr::col(Todos::Id).eq(id))
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every listed todo owned by the user; ids owned by other users
    /// are left untouched. Returns the number actually deleted.
    pub async fn delete_many(
        pool: &PgPool,
        ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        let (sql, values) = Query::delete()
            .from_table(Todos::Table)
            .and_where(Expr::col(Todos::Id).is_in(ids.iter().copied()))
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(pool).await?;

        Ok(result.rows_affected())
    }

    /// Status/priority projection over all of a user's todos, for statistics
    pub async fn status_priority(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<(TodoStatus, TodoPriority)>, DomainError> {
        let (sql, values) = Query::select()
            .columns([Todos::Status, Todos::Priority])
            .from(Todos::Table)
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .build_sqlx(PostgresQueryBuilder);

        let rows: Vec<(String, String)> = sqlx::query_as_with(&sql, values)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(status, priority)| {
                (
                    TodoStatus::from_str(&status).unwrap_or(TodoStatus::Pending),
                    TodoPriority::from_str(&priority).unwrap_or(TodoPriority::Medium),
                )
            })
            .collect())
    }

    fn filter_condition(filter: &TodoFilter) -> Cond {
        let mut condition = Cond::all().add(Expr::col(Todos::UserId).eq(filter.user_id));

        if let Some(status) = filter.status {
            condition = condition.add(Expr::col(Todos::Status).eq(status));
        }

        if let Some(priority) = filter.priority {
            condition = condition.add(Expr::col(Todos::Priority).eq(priority));
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            condition = condition.add(
                Cond::any()
                    .add(Expr::col(Todos::Title).ilike(pattern.clone()))
                    .add(Expr::col(Todos::Description).ilike(pattern)),
            );
        }

        condition
    }

    fn priority_rank() -> SimpleExpr {
        Expr::cust("CASE priority WHEN 'low' THEN 1 WHEN 'medium' THEN 2 WHEN 'high' THEN 3 END")
    }
}
