use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthFeatureError {
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Email already in use: {0}")]
    EmailExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("User not found: {0}")]
    UserNotFound(uuid::Uuid),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}
