//! Token error taxonomy and supporting error types.

use st_shared::error_codes;
use thiserror::Error;

/// Errors surfaced by the codec and the token service
///
/// `MalformedToken` and `InvalidSignature` should be handled identically by
/// callers (see [`TokenError::is_rejection`]); `Expired` and `Revoked` may be
/// reported distinctly.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Token encoding failed: {0}")]
    EncodeFailure(#[source] serde_json::Error),

    #[error("Revocation store failure: {0}")]
    RevocationStoreFailure(#[from] StoreError),
}

impl TokenError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => error_codes::TOKEN_MALFORMED,
            TokenError::InvalidSignature => error_codes::TOKEN_INVALID_SIGNATURE,
            TokenError::Expired => error_codes::TOKEN_EXPIRED,
            TokenError::Revoked => error_codes::TOKEN_REVOKED,
            TokenError::EncodeFailure(_) => error_codes::TOKEN_ENCODE_FAILED,
            TokenError::RevocationStoreFailure(_) => error_codes::REVOCATION_STORE_ERROR,
        }
    }

    /// Numeric error code
    pub fn numeric_code(&self) -> u32 {
        match self {
            TokenError::MalformedToken => 40101,
            TokenError::InvalidSignature => 40102,
            TokenError::Expired => 40103,
            TokenError::Revoked => 40104,
            TokenError::EncodeFailure(_) => 50001,
            TokenError::RevocationStoreFailure(_) => 50301,
        }
    }

    /// True for failures that must be rejected without telling the caller
    /// which check failed
    pub fn is_rejection(&self) -> bool {
        matches!(self, TokenError::MalformedToken | TokenError::InvalidSignature)
    }

    /// True when the client should obtain a new token by re-authenticating
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, TokenError::Expired | TokenError::Revoked)
    }
}

/// Errors reported by a revocation store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Revocation store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Revocation store operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Revocation store error: {message}")]
    Backend { message: String },
}

/// Invalid token service configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Signing secret must not be empty")]
    EmptySecret,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

pub type TokenResult<T> = Result<T, TokenError>;

#[cfg(test)]
mod tests;
