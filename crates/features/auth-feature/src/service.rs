use domain::{DomainError, User, UserRepository};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::AuthFeatureError;
use crate::password;
use crate::token::{TokenPair, TokenService};

/// Input for registering a new user
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Input for logging in
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for updating a profile. Omitted fields keep their current value.
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// An authenticated session: the user's public profile plus a token pair.
/// The caller decides transport (refresh token in an http-only cookie,
/// access token in the response body).
pub struct AuthSession {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Service for authentication workflows. Sessions are stateless; a token
/// pair is the only session artifact.
pub struct AuthService;

impl AuthService {
    /// Register a new user and start a session
    pub async fn register(
        pool: &PgPool,
        tokens: &TokenService,
        input: RegisterInput,
    ) -> Result<AuthSession, AuthFeatureError> {
        if UserRepository::find_by_email(pool, &input.email)
            .await?
            .is_some()
        {
            return Err(AuthFeatureError::EmailExists(input.email));
        }

        let password_hash = password::hash(&input.password)?;

        // The pre-check races with concurrent registrations; the unique
        // index is the authority.
        let user = UserRepository::create(pool, &input.username, &input.email, &password_hash)
            .await
            .map_err(|err| match err {
                DomainError::UniqueViolation(_) => {
                    AuthFeatureError::EmailExists(input.email.clone())
                }
                other => AuthFeatureError::Domain(other),
            })?;

        info!(user_id = %user.id, email = %user.email, "new user registered");

        let pair = tokens.issue(user.id)?;

        Ok(AuthSession {
            user: user.into(),
            tokens: pair,
        })
    }

    /// Log a user in. Unknown email and wrong password fail identically so
    /// the endpoint cannot be used to enumerate accounts.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        input: LoginInput,
    ) -> Result<AuthSession, AuthFeatureError> {
        let user = UserRepository::find_by_email(pool, &input.email)
            .await?
            .ok_or(AuthFeatureError::InvalidCredentials)?;

        if !password::verify(&input.password, &user.password_hash)? {
            return Err(AuthFeatureError::InvalidCredentials);
        }

        let user = UserRepository::record_login(pool, user.id)
            .await?
            .ok_or(AuthFeatureError::InvalidCredentials)?;

        info!(user_id = %user.id, "user logged in");

        let pair = tokens.issue(user.id)?;

        Ok(AuthSession {
            user: user.into(),
            tokens: pair,
        })
    }

    /// Rotate a session from a refresh token. The old refresh token is
    /// superseded, not revoked; there is no denylist.
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenService,
        refresh_token: &str,
    ) -> Result<AuthSession, AuthFeatureError> {
        let user_id = tokens.verify_refresh(refresh_token)?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthFeatureError::UserNotFound(user_id))?;

        let pair = tokens.issue(user.id)?;

        Ok(AuthSession {
            user: user.into(),
            tokens: pair,
        })
    }

    /// Fetch the caller's profile
    pub async fn profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, AuthFeatureError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthFeatureError::UserNotFound(user_id))?;

        Ok(user.into())
    }

    /// Partially update the caller's profile. Fails with `EmailExists` when
    /// the new email belongs to a different user.
    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, AuthFeatureError> {
        let current = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthFeatureError::UserNotFound(user_id))?;

        if let Some(email) = &input.email {
            if *email != current.email {
                if let Some(other) = UserRepository::find_by_email(pool, email).await? {
                    if other.id != user_id {
                        return Err(AuthFeatureError::EmailExists(email.clone()));
                    }
                }
            }
        }

        let user = UserRepository::update_profile(
            pool,
            user_id,
            input.username.as_deref(),
            input.email.as_deref(),
        )
        .await
        .map_err(|err| match err {
            DomainError::UniqueViolation(_) => {
                AuthFeatureError::EmailExists(input.email.clone().unwrap_or_default())
            }
            other => AuthFeatureError::Domain(other),
        })?
        .ok_or(AuthFeatureError::UserNotFound(user_id))?;

        Ok(user.into())
    }
}
