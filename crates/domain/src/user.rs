use sea_query::{Expr, Iden, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::DomainError;

/// Schema definition for the users table
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

const USER_COLUMNS: [Users; 7] = [
    Users::Id,
    Users::Username,
    Users::Email,
    Users::PasswordHash,
    Users::LastLoginAt,
    Users::CreatedAt,
    Users::UpdatedAt,
];

/// User entity. The password is only ever held as a one-way hash.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Repository for User operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user. A duplicate email surfaces as
    /// `DomainError::UniqueViolation`.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DomainError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::insert()
            .into_table(Users::Table)
            .columns([
                Users::Id,
                Users::Username,
                Users::Email,
                Users::PasswordHash,
                Users::CreatedAt,
                Users::UpdatedAt,
            ])
            .values_panic([
                id.into(),
                username.into(),
                email.into(),
                password_hash.into(),
                now.into(),
                now.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let user = sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DomainError> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let user = sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DomainError> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Email).eq(email))
            .build_sqlx(PostgresQueryBuilder);

        let user = sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Stamp the user's last login time
    pub async fn record_login(pool: &PgPool, id: Uuid) -> Result<Option<User>, DomainError> {
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::update()
            .table(Users::Table)
            .values([
                (Users::LastLoginAt, now.into()),
                (Users::UpdatedAt, now.into()),
            ])
            .and_where(Expr::col(Users::Id).eq(id))
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let user = sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Partially update a user's profile. Omitted fields keep their
    /// current value.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        if username.is_none() && email.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let now = OffsetDateTime::now_utc();

        let mut stmt = Query::update();
        stmt.table(Users::Table);
        if let Some(username) = username {
            stmt.value(Users::Username, username);
        }
        if let Some(email) = email {
            stmt.value(Users::Email, email);
        }
        stmt.value(Users::UpdatedAt, now)
            .and_where(Expr::col(Users::Id).eq(id))
            .returning_all();

        let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);

        let user = sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Delete a user. Todos cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DomainError> {
        let (sql, values) = Query::delete()
            .from_table(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
