use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::AuthFeatureError;

/// Claims carried by both access and refresh tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies signed access/refresh tokens. Access and refresh
/// tokens use independent secrets, so a leak of one key space does not
/// compromise the other. Verification is a pure function of secret + claims;
/// no state is kept per token.
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Token service with the default lifetimes: 1 hour access, 7 days refresh
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self::with_ttls(
            access_secret,
            refresh_secret,
            Duration::hours(1),
            Duration::days(7),
        )
    }

    pub fn with_ttls(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of refresh tokens, for cookie max-age
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a new token pair bound to the user
    pub fn issue(&self, user_id: Uuid) -> Result<TokenPair, AuthFeatureError> {
        let access_token = Self::sign(user_id, &self.access_secret, self.access_ttl)?;
        let refresh_token = Self::sign(user_id, &self.refresh_secret, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token and return the bound user id
    pub fn verify_access(&self, token: &str) -> Result<Uuid, AuthFeatureError> {
        Self::verify(token, &self.access_secret)
    }

    /// Verify a refresh token and return the bound user id
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, AuthFeatureError> {
        Self::verify(token, &self.refresh_secret)
    }

    fn sign(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthFeatureError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|_| AuthFeatureError::InvalidToken)
    }

    fn verify(token: &str, secret: &str) -> Result<Uuid, AuthFeatureError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthFeatureError::ExpiredToken,
            _ => AuthFeatureError::InvalidToken,
        })?;

        Ok(data.claims.sub)
    }
}
