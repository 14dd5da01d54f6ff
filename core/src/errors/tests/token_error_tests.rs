//! Unit tests for token error types

use crate::errors::{StoreError, TokenError};

#[test]
fn test_error_codes() {
    assert_eq!(TokenError::MalformedToken.code(), "TOKEN_MALFORMED");
    assert_eq!(TokenError::InvalidSignature.code(), "TOKEN_INVALID_SIGNATURE");
    assert_eq!(TokenError::Expired.code(), "TOKEN_EXPIRED");
    assert_eq!(TokenError::Revoked.code(), "TOKEN_REVOKED");

    let store = TokenError::from(StoreError::Timeout { timeout_ms: 10 });
    assert_eq!(store.code(), "REVOCATION_STORE_ERROR");
    assert_eq!(store.numeric_code(), 50301);
}

#[test]
fn test_rejections_are_grouped() {
    assert!(TokenError::MalformedToken.is_rejection());
    assert!(TokenError::InvalidSignature.is_rejection());
    assert!(!TokenError::Expired.is_rejection());
    assert!(!TokenError::Revoked.is_rejection());
}

#[test]
fn test_reauthentication_errors_stay_distinct() {
    assert!(TokenError::Expired.requires_reauthentication());
    assert!(TokenError::Revoked.requires_reauthentication());
    assert_ne!(
        TokenError::Expired.numeric_code(),
        TokenError::Revoked.numeric_code()
    );
    assert!(!TokenError::MalformedToken.requires_reauthentication());
}

#[test]
fn test_rejection_messages_do_not_leak_details() {
    // Same class of failure, no hint about which field was wrong
    assert_eq!(TokenError::MalformedToken.to_string(), "Malformed token");
}

#[test]
fn test_store_error_conversion() {
    let error: TokenError = StoreError::Unavailable {
        message: "connection refused".to_string(),
    }
    .into();
    assert!(matches!(
        error,
        TokenError::RevocationStoreFailure(StoreError::Unavailable { .. })
    ));
    assert!(error.to_string().contains("connection refused"));
}

#[test]
fn test_encode_failure_keeps_source() {
    use std::error::Error;

    let json_error = serde_json::from_str::<i64>("not json").unwrap_err();
    let error = TokenError::EncodeFailure(json_error);
    assert_eq!(error.code(), "TOKEN_ENCODE_FAILED");
    assert!(error.source().is_some());
}
