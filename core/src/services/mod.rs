//! Services containing the token protocol.

pub mod token;

// Re-export commonly used types
pub use token::{RevocationCheckPolicy, TokenCodec, TokenService, TokenServiceConfig};
