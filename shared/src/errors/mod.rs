//! Shared error codes

/// Machine-readable error codes for token failures
pub mod error_codes {
    pub const TOKEN_MALFORMED: &str = "TOKEN_MALFORMED";
    pub const TOKEN_INVALID_SIGNATURE: &str = "TOKEN_INVALID_SIGNATURE";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_REVOKED: &str = "TOKEN_REVOKED";
    pub const TOKEN_ENCODE_FAILED: &str = "TOKEN_ENCODE_FAILED";
    pub const REVOCATION_STORE_ERROR: &str = "REVOCATION_STORE_ERROR";
}
