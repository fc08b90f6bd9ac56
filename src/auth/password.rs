use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("stored digest is not a valid PHC string")]
    InvalidDigest,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password with Argon2 and a fresh random salt.
///
/// Two calls with the same input produce different digests; both verify.
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    if plain.is_empty() {
        return Err(HashError::EmptyPassword);
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            HashError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC digest.
///
/// A mismatch is `Ok(false)`, not an error; only a digest that cannot be
/// parsed is an error. Comparison is constant-time inside the argon2 crate.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        warn!(error = %e, "malformed password digest");
        HashError::InvalidDigest
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashError::Hash(e.to_string())),
    }
}

/// Run [`hash_password`] on the blocking pool so the deliberately slow
/// key derivation never stalls the async runtime.
pub async fn hash_password_async(plain: String) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| HashError::Hash(e.to_string()))?
}

/// Blocking-pool counterpart of [`verify_password`].
pub async fn verify_password_async(plain: String, digest: String) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &digest))
        .await
        .map_err(|e| HashError::Hash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let digest = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &digest).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let digest = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &digest).expect("verify should not error"));
    }

    #[test]
    fn same_password_hashes_to_distinct_digests() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("password123", &a).unwrap());
        assert!(verify_password("password123", &b).unwrap());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(hash_password(""), Err(HashError::EmptyPassword)));
    }

    #[test]
    fn verify_errors_on_malformed_digest() {
        assert!(matches!(
            verify_password("anything", "not-a-valid-hash"),
            Err(HashError::InvalidDigest)
        ));
    }

    #[tokio::test]
    async fn offloaded_wrappers_match_sync_behavior() {
        let digest = hash_password_async("password123".into()).await.unwrap();
        assert!(verify_password_async("password123".into(), digest.clone())
            .await
            .unwrap());
        assert!(!verify_password_async("nope".into(), digest).await.unwrap());
    }
}
