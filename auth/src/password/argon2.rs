use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Credential hasher for stored passwords.
///
/// Produces Argon2id PHC strings with a fresh random salt per call, so hashing
/// the same plaintext twice never yields the same credential. Both operations
/// are CPU bound; async callers should run them on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password for storage.
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - The hashing primitive itself failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext candidate against a stored credential.
    ///
    /// Salt and cost parameters are read back from the PHC string, and the
    /// digest comparison is constant time.
    ///
    /// # Returns
    /// `true` on match, `false` on mismatch
    ///
    /// # Errors
    /// * `VerificationFailed` - The stored credential is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("secret123").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "secret123");
        assert!(hasher
            .verify("secret123", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_mismatch_returns_false() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("secret123").expect("Failed to hash password");

        assert!(!hasher
            .verify("secret124", &hash)
            .expect("Mismatch must not be an error"));
        assert!(!hasher.verify("", &hash).expect("Mismatch must not be an error"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("secret123").expect("Failed to hash password");
        let second = hasher.hash("secret123").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify("secret123", &first).unwrap());
        assert!(hasher.verify("secret123", &second).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("secret123", "secret123");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }
}
