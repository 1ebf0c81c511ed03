pub mod claims;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use claims::IdentityClaims;
pub use claims::TOKEN_LIFETIME_SECS;
pub use errors::TokenError;
pub use service::TokenService;
