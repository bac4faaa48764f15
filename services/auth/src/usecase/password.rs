//! Password hashing via bcrypt.

use rand::RngExt;

use crate::error::AuthServiceError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

const UNUSABLE_PASSWORD_LEN: usize = 48;
const UNUSABLE_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.~!@#$%^&*";

pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash. A malformed stored hash is an
/// internal error, not a credential mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthServiceError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("bcrypt verify: {e}")))
}

/// Hash of a random secret nobody knows, for identities created through an
/// external provider. Password login stays impossible until a reset.
pub fn unusable_password_hash() -> Result<String, AuthServiceError> {
    let mut rng = rand::rng();
    let secret: String = (0..UNUSABLE_PASSWORD_LEN)
        .map(|_| UNUSABLE_CHARSET[rng.random_range(0..UNUSABLE_CHARSET.len())] as char)
        .collect();
    hash_password(&secret)
}
