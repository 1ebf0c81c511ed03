use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Lifetime of an access token, in seconds. Not configurable.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Identity snapshot carried inside an access token.
///
/// Captured at login and never refreshed from storage while the token lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Opaque unique user identifier
    pub id: String,
    pub username: String,
    pub email: String,
}

impl IdentityClaims {
    pub fn new(id: impl ToString, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Full signed payload: the identity plus its validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user: IdentityClaims,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build the payload for a token issued at `now`, expiring one hour later.
    pub fn issued_at(user: IdentityClaims, now: DateTime<Utc>) -> Self {
        let expiration = now + Duration::seconds(TOKEN_LIFETIME_SECS);

        Self {
            user,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// A token stops being valid at the very second named by `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
