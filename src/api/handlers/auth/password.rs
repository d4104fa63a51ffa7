//! Argon2id hashing for passwords and verification codes.
//!
//! Both secrets use the same one-way primitive: a random salt per hash, the
//! PHC string stored, and verification only through `verify_secret`. Plaintext
//! never reaches the database.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;

/// Hash a secret (password or OTP code) with Argon2id and a random salt.
pub(super) fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| anyhow!("failed to hash secret"))
}

/// Verify a secret against a stored PHC hash string.
///
/// Returns `false` for a mismatch; an unparseable stored hash is an error so
/// corruption does not masquerade as a bad credential.
pub(super) fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| anyhow!("invalid stored hash"))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::{hash_secret, verify_secret};
    use anyhow::Result;

    #[test]
    fn hash_and_verify_round_trip() -> Result<()> {
        let hash = hash_secret("password1")?;
        assert!(verify_secret("password1", &hash)?);
        assert!(!verify_secret("password2", &hash)?);
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<()> {
        let first = hash_secret("123456")?;
        let second = hash_secret("123456")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify_secret("password1", "not-a-phc-string").is_err());
    }
}
