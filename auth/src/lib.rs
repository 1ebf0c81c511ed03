//! Authentication core
//!
//! Provides the pieces every protected operation depends on:
//! - Password hashing (Argon2id)
//! - Signed, time-bounded access tokens (HS256 JWT)
//! - The access gate that turns a bearer header into a resolved identity
//!
//! The gate knows nothing about storage. Services plug their user store in
//! through [`IdentityResolver`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("secret123").unwrap();
//! assert!(hasher.verify("secret123", &hash).unwrap());
//! assert!(!hasher.verify("secret124", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{IdentityClaims, TokenService};
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let identity = IdentityClaims::new("user123", "alice", "a@x.com");
//! let token = tokens.issue(&identity).unwrap();
//! assert_eq!(tokens.verify(&token).unwrap(), identity);
//! ```
//!
//! ## Login Flow
//! ```
//! use auth::{Authenticator, IdentityClaims};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("secret123").unwrap();
//!
//! // Login: verify and issue token
//! let identity = IdentityClaims::new("user123", "alice", "a@x.com");
//! let result = auth.authenticate("secret123", &hash, &identity).unwrap();
//!
//! // Later requests
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.username, "alice");
//! ```

pub mod authenticator;
pub mod gate;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use gate::AccessGate;
pub use gate::GateRejection;
pub use gate::IdentityResolver;
pub use jwt::Claims;
pub use jwt::IdentityClaims;
pub use jwt::TokenError;
pub use jwt::TokenService;
pub use password::PasswordError;
pub use password::PasswordHasher;
