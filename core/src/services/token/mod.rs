//! Token service module
//!
//! This module handles all token-related operations including:
//! - Encoding and signing tokens (HMAC-SHA256)
//! - Decoding and verifying tokens, including expiry
//! - Refresh with single-use revocation of the old token
//! - Explicit revocation and reinstatement

mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use config::{RevocationCheckPolicy, TokenServiceConfig};
pub use service::TokenService;
