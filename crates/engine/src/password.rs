//! Password hashing for the credential store.
//!
//! Hashes are Argon2id PHC strings, which embed their own salt and
//! parameters, so verification needs nothing but the stored string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use crate::{EngineError, ResultEngine};

/// Hash a password using Argon2id with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

/// Verify a password against its stored hash.
///
/// Returns `Ok(false)` on mismatch; a malformed stored hash is an error.
pub(crate) fn verify_password(password: &str, password_hash: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|err| EngineError::PasswordHash(err.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking pool, off the async workers.
pub(crate) async fn hash_password_blocking(password: String) -> ResultEngine<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub(crate) async fn verify_password_blocking(
    password: String,
    password_hash: String,
) -> ResultEngine<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}
