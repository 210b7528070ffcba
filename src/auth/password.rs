use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::ApiError;

/// Hash a plaintext password with a fresh random salt.
pub fn hash(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })
}

/// Verify a plaintext password against a stored hash. An unparseable stored
/// hash counts as a mismatch rather than an error.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash("password123").unwrap();
        assert_ne!(hashed, "password123");
        assert!(verify("password123", &hashed));
        assert!(!verify("wrong", &hashed));
    }

    #[test]
    fn test_unparseable_hash_is_mismatch() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
