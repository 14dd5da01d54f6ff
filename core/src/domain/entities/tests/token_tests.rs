//! Unit tests for token entities

use crate::domain::entities::token::{Header, Payload, UserInfo, ALGORITHM};

#[test]
fn test_header_wire_format() {
    let json = serde_json::to_string(&Header::default()).unwrap();
    assert_eq!(json, r#"{"typ":"token","alg":"HS256"}"#);
}

#[test]
fn test_header_without_typ_is_accepted() {
    let header: Header = serde_json::from_str(r#"{"alg":"HS256"}"#).unwrap();
    assert!(header.is_supported());
    assert!(header.typ.is_empty());
}

#[test]
fn test_header_rejects_other_algorithms() {
    let header: Header = serde_json::from_str(r#"{"typ":"JWT","alg":"HS512"}"#).unwrap();
    assert!(!header.is_supported());
    assert_ne!(header.alg, ALGORITHM);
}

#[test]
fn test_payload_wire_format() {
    let payload = Payload::new(1_700_003_600, UserInfo::new(1234, 1_700_000_000));
    let json = serde_json::to_string(&payload).unwrap();
    assert_eq!(
        json,
        r#"{"Exp":1700003600,"UserInfo":{"Id":1234,"Time":1700000000}}"#
    );
}

#[test]
fn test_payload_accepts_lowercase_fields() {
    let payload: Payload =
        serde_json::from_str(r#"{"exp":10,"userInfo":{"id":7,"time":3}}"#).unwrap();
    assert_eq!(payload, Payload::new(10, UserInfo::new(7, 3)));
}

#[test]
fn test_payload_requires_user_info() {
    assert!(serde_json::from_str::<Payload>(r#"{"Exp":10,"UserInfo":null}"#).is_err());
    assert!(serde_json::from_str::<Payload>(r#"{"Exp":10}"#).is_err());
}

#[test]
fn test_issue_sets_expiry_from_lifetime() {
    let payload = Payload::issue(42, 1000, 3600);
    assert_eq!(payload.exp, 4600);
    assert_eq!(payload.user_info, UserInfo::new(42, 1000));
}

#[test]
fn test_issue_saturates_on_overflow() {
    let payload = Payload::issue(1, i64::MAX - 5, 3600);
    assert_eq!(payload.exp, i64::MAX);
}

#[test]
fn test_expiry_boundary() {
    let payload = Payload::issue(1, 1000, 100);
    assert!(!payload.is_expired_at(1099));
    assert!(payload.is_expired_at(1100));
    assert!(payload.is_expired_at(1101));
}

#[test]
fn test_age_and_remaining() {
    let payload = Payload::issue(1, 1000, 100);
    assert_eq!(payload.age_at(1030), 30);
    assert_eq!(payload.remaining_at(1030), 70);
    assert_eq!(payload.remaining_at(2000), 0);
}
