use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::IdentityClaims;
use super::errors::TokenError;

/// Issues and verifies stateless access tokens.
///
/// Tokens are HS256 JWTs over [`Claims`], valid for one hour from issuance.
/// Validity is purely a function of signature and expiry: there is no
/// revocation list, and rotating the secret kills every outstanding token.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenService {
    /// Create a token service bound to a shared secret.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration at startup, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a token for `identity`, stamped with the current time.
    ///
    /// # Errors
    /// * `SigningFailed` - Serialization or signing failed
    pub fn issue(&self, identity: &IdentityClaims) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the clock read `now`.
    pub fn issue_at(
        &self,
        identity: &IdentityClaims,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::issued_at(identity.clone(), now);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a presented token against the current time.
    ///
    /// # Returns
    /// The identity exactly as it was embedded at issuance
    ///
    /// # Errors
    /// * `SignatureInvalid` - Forged, corrupted, or signed with another secret
    /// * `Expired` - Signature is good but the validity window has passed
    /// * `Malformed` - Not a decodable HS256 token
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a presented token as if the clock read `now`.
    ///
    /// The signature is always checked before the expiry, so a forged token
    /// never reports `Expired`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is judged against the caller's clock below, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims.user)
    }
}
