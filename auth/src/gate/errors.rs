use thiserror::Error;

use crate::jwt::TokenError;

/// Why the access gate turned a request away.
///
/// Every reason surfaces to the caller as 401. `TokenExpired` and
/// `InvalidToken` keep distinct messages, matching the behaviour clients
/// already depend on.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GateRejection {
    #[error("Not authorized, no token provided")]
    NoCredential,

    #[error("Not authorized, token failed (invalid)")]
    InvalidToken,

    #[error("Not authorized, token expired")]
    TokenExpired,

    #[error("Not authorized, user not found")]
    UserNotFound,

    /// Identity lookup failed or timed out. The gate fails closed.
    #[error("Not authorized, token verification failed")]
    InternalError,
}

impl GateRejection {
    /// Short machine-readable tag for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            GateRejection::NoCredential => "no_credential",
            GateRejection::InvalidToken => "invalid_token",
            GateRejection::TokenExpired => "token_expired",
            GateRejection::UserNotFound => "user_not_found",
            GateRejection::InternalError => "internal_error",
        }
    }
}

impl From<TokenError> for GateRejection {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::SignatureInvalid | TokenError::Malformed(_) => GateRejection::InvalidToken,
            TokenError::Expired => GateRejection::TokenExpired,
            TokenError::SigningFailed(_) => GateRejection::InternalError,
        }
    }
}
