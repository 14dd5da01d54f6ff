//! Domain layer containing the token data model.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
