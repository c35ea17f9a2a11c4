//! bcrypt password hashing at a fixed work factor.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool to keep
//! the async executor free.

use bcrypt::{hash, verify};

/// Work factor for every stored hash.
pub const PASSWORD_COST: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(password, PASSWORD_COST)).await??;
    Ok(hashed)
}

/// `Ok(false)` on mismatch. A hash that cannot be parsed also counts as a mismatch.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let ok = tokio::task::spawn_blocking(move || verify(password, &password_hash).unwrap_or(false))
        .await?;
    Ok(ok)
}
