//! Password Verifier
//! Mission: Hash and check passwords without ever exposing either side

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password for storage.
pub fn hash_password(plaintext: &str) -> Result<String> {
    hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Compare a candidate password against a stored bcrypt hash.
///
/// Fails closed: a malformed stored hash yields `false` rather than
/// an error the caller could mistake for success. Neither the
/// candidate nor the hash is ever logged.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    verify(candidate, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hashed = hash_password("correct horse battery staple").unwrap();

        assert!(verify_password("correct horse battery staple", &hashed));
        assert!(!verify_password("wrong password", &hashed));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("pw1").unwrap();
        let b = hash_password("pw1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_fails_closed() {
        assert!(!verify_password("pw1", "not-a-bcrypt-hash"));
        assert!(!verify_password("pw1", ""));
    }
}
