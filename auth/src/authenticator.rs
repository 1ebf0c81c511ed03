use std::sync::Arc;
use std::time::Duration;

use crate::gate::AccessGate;
use crate::jwt::IdentityClaims;
use crate::jwt::TokenError;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Owns the process-wide [`TokenService`] and hands it to the [`AccessGate`]
/// so that login and request authorization always agree on the secret.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: Arc<TokenService>,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing, read once at startup
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_service: Arc::new(TokenService::new(jwt_secret)),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `identity` - Claims to embed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `TokenError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &IdentityClaims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_service.issue(identity)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Verify a token and return its embedded identity.
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.token_service.verify(token)
    }

    /// Build an access gate that verifies with this authenticator's secret.
    ///
    /// # Arguments
    /// * `lookup_timeout` - Upper bound on each identity lookup
    pub fn access_gate(&self, lookup_timeout: Duration) -> AccessGate {
        AccessGate::new(Arc::clone(&self.token_service), lookup_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateRejection;
    use crate::gate::DEFAULT_LOOKUP_TIMEOUT;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn alice() -> IdentityClaims {
        IdentityClaims::new("user123", "alice", "a@x.com")
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("secret123")
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate("secret123", &hash, &alice())
            .expect("Authentication failed");
        assert!(!result.access_token.is_empty());

        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded, alice());
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(SECRET);
        let hash = authenticator
            .hash_password("secret123")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, &alice());
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = Authenticator::new(SECRET);

        let result = authenticator.authenticate("secret123", "not-a-phc-string", &alice());
        assert!(matches!(result, Err(AuthenticationError::PasswordError(_))));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET);

        let result = authenticator.validate_token("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_gate_shares_secret() {
        let authenticator = Authenticator::new(SECRET);
        let other = Authenticator::new(b"another_secret_at_least_32_bytes!!");
        let hash = authenticator.hash_password("secret123").unwrap();
        let token = authenticator
            .authenticate("secret123", &hash, &alice())
            .unwrap()
            .access_token;

        let gate = authenticator.access_gate(DEFAULT_LOOKUP_TIMEOUT);
        let foreign_gate = other.access_gate(DEFAULT_LOOKUP_TIMEOUT);
        let header = format!("Bearer {}", token);

        struct Echo;

        #[async_trait::async_trait]
        impl crate::gate::IdentityResolver for Echo {
            type Identity = IdentityClaims;
            type Error = String;

            async fn resolve(
                &self,
                claims: &IdentityClaims,
            ) -> Result<Option<IdentityClaims>, String> {
                Ok(Some(claims.clone()))
            }
        }

        assert_eq!(gate.admit(Some(header.as_str()), &Echo).await, Ok(alice()));
        assert_eq!(
            foreign_gate.admit(Some(header.as_str()), &Echo).await,
            Err(GateRejection::InvalidToken)
        );
    }
}
