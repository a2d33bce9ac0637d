use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use crate::error::AuthFeatureError;

/// Hash a password with Argon2id and a fresh random salt
pub fn hash(password: &str) -> Result<String, AuthFeatureError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthFeatureError::PasswordHash(err.to_string()))
}

/// Verify a password against a stored hash
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, AuthFeatureError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| AuthFeatureError::PasswordHash(err.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
