pub mod access_gate;
pub mod errors;

pub use access_gate::AccessGate;
pub use access_gate::IdentityResolver;
pub use access_gate::BEARER_SCHEME;
pub use access_gate::DEFAULT_LOOKUP_TIMEOUT;
pub use errors::GateRejection;
