use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::errors::GateRejection;
use crate::jwt::IdentityClaims;
use crate::jwt::TokenService;

/// Authorization scheme accepted by the gate. Matched case-sensitively.
pub const BEARER_SCHEME: &str = "Bearer";

/// Default bound on the identity lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves verified token claims to the current state of the user they name.
///
/// Implementations read the user store and must strip the stored credential
/// from what they return.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    type Identity: Send;
    type Error: Display + Send;

    /// Look up the user named by `claims`.
    ///
    /// # Returns
    /// `Some(identity)` if the user still exists, `None` otherwise
    ///
    /// # Errors
    /// Any store failure. The gate rejects the request when this happens.
    async fn resolve(&self, claims: &IdentityClaims)
        -> Result<Option<Self::Identity>, Self::Error>;
}

/// Gate in front of every protected operation.
///
/// Runs extract, verify, resolve in that order and stops at the first failure.
/// The resolver is called at most once per evaluation and nothing is cached
/// between evaluations, so deleted or edited users are seen immediately.
pub struct AccessGate {
    tokens: Arc<TokenService>,
    lookup_timeout: Duration,
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenService>, lookup_timeout: Duration) -> Self {
        Self {
            tokens,
            lookup_timeout,
        }
    }

    /// Pull the token out of an `Authorization` header value.
    ///
    /// # Errors
    /// * `NoCredential` - Header absent, not exactly `Bearer <token>`, or the
    ///   token is empty or contains whitespace
    pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, GateRejection> {
        let (scheme, token) = authorization
            .and_then(|value| value.split_once(' '))
            .ok_or(GateRejection::NoCredential)?;

        if scheme != BEARER_SCHEME || token.is_empty() || token.contains(char::is_whitespace) {
            return Err(GateRejection::NoCredential);
        }

        Ok(token)
    }

    /// Evaluate one request.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header, if the request had one
    /// * `resolver` - Store lookup for the claimed user
    ///
    /// # Returns
    /// The resolved identity to attach to the request
    ///
    /// # Errors
    /// The [`GateRejection`] naming the first step that failed
    pub async fn admit<R>(
        &self,
        authorization: Option<&str>,
        resolver: &R,
    ) -> Result<R::Identity, GateRejection>
    where
        R: IdentityResolver,
    {
        let token = Self::extract_bearer(authorization)?;

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            GateRejection::from(e)
        })?;

        match tokio::time::timeout(self.lookup_timeout, resolver.resolve(&claims)).await {
            Ok(Ok(Some(identity))) => Ok(identity),
            Ok(Ok(None)) => Err(GateRejection::UserNotFound),
            Ok(Err(e)) => {
                tracing::error!(user_id = %claims.id, error = %e, "Identity lookup failed");
                Err(GateRejection::InternalError)
            }
            Err(_) => {
                tracing::error!(
                    user_id = %claims.id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Identity lookup timed out"
                );
                Err(GateRejection::InternalError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use chrono::Duration as ChronoDuration;
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    /// Store double keyed by user id; counts lookups.
    #[derive(Default)]
    struct StubResolver {
        users: Mutex<HashMap<String, String>>,
        calls: AtomicUsize,
    }

    impl StubResolver {
        fn with_user(id: &str, username: &str) -> Self {
            let resolver = Self::default();
            resolver
                .users
                .lock()
                .unwrap()
                .insert(id.to_string(), username.to_string());
            resolver
        }

        fn remove(&self, id: &str) {
            self.users.lock().unwrap().remove(id);
        }
    }

    #[async_trait]
    impl IdentityResolver for StubResolver {
        type Identity = String;
        type Error = String;

        async fn resolve(&self, claims: &IdentityClaims) -> Result<Option<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.lock().unwrap().get(&claims.id).cloned())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl IdentityResolver for FailingResolver {
        type Identity = String;
        type Error = String;

        async fn resolve(&self, _claims: &IdentityClaims) -> Result<Option<String>, String> {
            Err("connection refused".to_string())
        }
    }

    struct StalledResolver;

    #[async_trait]
    impl IdentityResolver for StalledResolver {
        type Identity = String;
        type Error = String;

        async fn resolve(&self, _claims: &IdentityClaims) -> Result<Option<String>, String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some("too late".to_string()))
        }
    }

    fn gate() -> (AccessGate, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(SECRET));
        (
            AccessGate::new(Arc::clone(&tokens), DEFAULT_LOOKUP_TIMEOUT),
            tokens,
        )
    }

    fn alice() -> IdentityClaims {
        IdentityClaims::new("u-1", "alice", "a@x.com")
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(AccessGate::extract_bearer(Some("Bearer abc.def")), Ok("abc.def"));

        for header in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer "),
            Some("Bearerabc"),
            Some("bearer abc"),
            Some("BEARER abc"),
            Some("Basic dXNlcjpwYXNz"),
            Some("Token abc"),
            Some("Bearer  abc"),
            Some("Bearer abc def"),
            Some("Bearer abc "),
            Some("Bearer \tabc"),
        ] {
            assert_eq!(
                AccessGate::extract_bearer(header),
                Err(GateRejection::NoCredential),
                "header {:?}",
                header
            );
        }
    }

    #[tokio::test]
    async fn test_admit_valid_token() {
        let (gate, tokens) = gate();
        let resolver = StubResolver::with_user("u-1", "alice");
        let header = format!("Bearer {}", tokens.issue(&alice()).unwrap());

        let identity = gate.admit(Some(header.as_str()), &resolver).await;

        assert_eq!(identity, Ok("alice".to_string()));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_skips_lookup() {
        let (gate, _) = gate();
        let resolver = StubResolver::with_user("u-1", "alice");

        assert_eq!(
            gate.admit(None, &resolver).await,
            Err(GateRejection::NoCredential)
        );
        assert_eq!(
            gate.admit(Some("Basic dXNlcjpwYXNz"), &resolver).await,
            Err(GateRejection::NoCredential)
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reject_forged_token() {
        let (gate, _) = gate();
        let foreign = TokenService::new(b"another_secret_at_least_32_bytes!!");
        let resolver = StubResolver::with_user("u-1", "alice");
        let header = format!("Bearer {}", foreign.issue(&alice()).unwrap());

        assert_eq!(
            gate.admit(Some(header.as_str()), &resolver).await,
            Err(GateRejection::InvalidToken)
        );
        assert_eq!(
            gate.admit(Some("Bearer garbage"), &resolver).await,
            Err(GateRejection::InvalidToken)
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reject_expired_token() {
        let (gate, tokens) = gate();
        let resolver = StubResolver::with_user("u-1", "alice");
        let issued_at = Utc::now() - ChronoDuration::seconds(3601);
        let header = format!("Bearer {}", tokens.issue_at(&alice(), issued_at).unwrap());

        assert_eq!(
            gate.admit(Some(header.as_str()), &resolver).await,
            Err(GateRejection::TokenExpired)
        );
    }

    #[tokio::test]
    async fn test_reject_deleted_user() {
        let (gate, tokens) = gate();
        let resolver = StubResolver::with_user("u-1", "alice");
        let header = format!("Bearer {}", tokens.issue(&alice()).unwrap());

        assert!(gate.admit(Some(header.as_str()), &resolver).await.is_ok());

        resolver.remove("u-1");
        assert_eq!(
            gate.admit(Some(header.as_str()), &resolver).await,
            Err(GateRejection::UserNotFound)
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let (gate, tokens) = gate();
        let header = format!("Bearer {}", tokens.issue(&alice()).unwrap());

        assert_eq!(
            gate.admit(Some(header.as_str()), &FailingResolver).await,
            Err(GateRejection::InternalError)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_fails_closed() {
        let tokens = Arc::new(TokenService::new(SECRET));
        let gate = AccessGate::new(Arc::clone(&tokens), Duration::from_millis(100));
        let header = format!("Bearer {}", tokens.issue(&alice()).unwrap());

        assert_eq!(
            gate.admit(Some(header.as_str()), &StalledResolver).await,
            Err(GateRejection::InternalError)
        );
    }
}
