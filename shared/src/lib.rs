//! Shared configuration and common constants for the session token workspace
//!
//! This crate provides functionality used by both the core and the
//! infrastructure crates:
//! - Configuration types
//! - Machine-readable error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, TokenConfig,
};
pub use errors::error_codes;
