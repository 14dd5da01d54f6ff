//! Token header and payload entities.
//!
//! Field names on the wire follow the established token format:
//! `{"typ":"token","alg":"HS256"}` for the header and
//! `{"Exp":..,"UserInfo":{"Id":..,"Time":..}}` for the payload. Lower-case
//! payload field names are accepted on decode.

use serde::{Deserialize, Serialize};

/// Signing algorithm identifier; the only one accepted on decode
pub const ALGORITHM: &str = "HS256";

/// Token type carried in the header
pub const TOKEN_TYPE: &str = "token";

/// Token header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, not checked on decode
    #[serde(default)]
    pub typ: String,

    /// Signing algorithm
    pub alg: String,
}

impl Header {
    /// True if the header names the algorithm this codec signs with
    pub fn is_supported(&self) -> bool {
        self.alg == ALGORITHM
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: ALGORITHM.to_string(),
        }
    }
}

/// Identity carried by a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject identifier
    #[serde(rename = "Id", alias = "id")]
    pub id: i64,

    /// Issued-at timestamp (seconds since epoch)
    #[serde(rename = "Time", alias = "time")]
    pub time: i64,
}

impl UserInfo {
    pub fn new(id: i64, time: i64) -> Self {
        Self { id, time }
    }
}

/// Token payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Absolute expiry (seconds since epoch)
    #[serde(rename = "Exp", alias = "exp")]
    pub exp: i64,

    /// Identity of the token holder
    #[serde(rename = "UserInfo", alias = "userInfo", alias = "user_info")]
    pub user_info: UserInfo,
}

impl Payload {
    /// Creates a payload from its parts
    pub fn new(exp: i64, user_info: UserInfo) -> Self {
        Self { exp, user_info }
    }

    /// Creates a payload for `user_id` issued at `issued_at` and valid for
    /// `lifetime_seconds`
    pub fn issue(user_id: i64, issued_at: i64, lifetime_seconds: i64) -> Self {
        Self {
            exp: issued_at.saturating_add(lifetime_seconds),
            user_info: UserInfo::new(user_id, issued_at),
        }
    }

    /// Expired when `now` has reached `exp`
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Seconds elapsed since the token was issued
    pub fn age_at(&self, now: i64) -> i64 {
        now.saturating_sub(self.user_info.time)
    }

    /// Seconds left before expiry, zero once expired
    pub fn remaining_at(&self, now: i64) -> i64 {
        self.exp.saturating_sub(now).max(0)
    }
}
