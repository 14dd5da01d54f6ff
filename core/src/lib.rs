//! # Session Token Core
//!
//! Signed session tokens for stateless authentication with server-side
//! revocation. This crate contains the token codec, the refresh/revocation
//! protocol, the revocation store contract and the error taxonomy.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
