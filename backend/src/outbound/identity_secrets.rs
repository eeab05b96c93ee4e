//! Password hashing and reset-token helpers shared by the identity adapters.
//!
//! Reset tokens are 32 random bytes, hex encoded for the administrator and
//! stored only as a SHA-256 digest. Passwords are stored as Argon2 PHC
//! strings.

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::domain::ports::IdentityStoreError;

const RESET_TOKEN_TTL_HOURS: i64 = 24;

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

/// Lifetime of a password reset token.
pub(crate) fn reset_token_ttl() -> Duration {
    Duration::hours(RESET_TOKEN_TTL_HOURS)
}

/// Fresh reset token and the digest to store for it.
pub(crate) fn new_reset_token() -> (String, String) {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    bytes.zeroize();
    let digest = token_digest(&token);
    (token, digest)
}

/// Hex SHA-256 digest of a token as stored at rest.
pub(crate) fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

/// Argon2 PHC string for `password`.
pub(crate) fn hash_password(password: &str) -> Result<String, IdentityStoreError> {
    let mut salt_bytes = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| IdentityStoreError::password_hash(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| IdentityStoreError::password_hash(err.to_string()))
}

/// [`hash_password`] on the blocking thread pool so Argon2 never stalls an
/// async worker.
pub(crate) async fn hash_password_blocking(password: &str) -> Result<String, IdentityStoreError> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| IdentityStoreError::password_hash(err.to_string()))?
}

/// Whether `password` matches the stored PHC string.
#[cfg(test)]
pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    PasswordHash::new(hash)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
