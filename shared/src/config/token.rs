//! Token signing and revocation configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// Session token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Secret key for signing tokens
    pub secret: String,

    /// Lifetime of newly issued tokens in seconds
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: i64,

    /// TTL of revocation markers in seconds
    #[serde(default = "default_revocation_ttl")]
    pub revocation_ttl: u64,

    /// Namespace prefix for revocation keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Timeout for a single revocation store call in milliseconds
    ///
    /// Must exceed [`CacheConfig::retry_budget`](super::CacheConfig::retry_budget)
    /// for the Redis client's retries to run before the call is cancelled.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Accept tokens when the revocation store cannot be reached
    #[serde(default)]
    pub fail_open: bool,

    /// Maximum age of a token measured from its issued-at time, in seconds
    #[serde(default)]
    pub max_token_age: Option<u64>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            token_lifetime: default_token_lifetime(),
            revocation_ttl: default_revocation_ttl(),
            key_prefix: default_key_prefix(),
            store_timeout_ms: default_store_timeout_ms(),
            fail_open: false,
            max_token_age: None,
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("TOKEN_SECRET").unwrap_or(defaults.secret),
            token_lifetime: env_parse("TOKEN_LIFETIME_SECONDS", defaults.token_lifetime),
            revocation_ttl: env_parse("TOKEN_REVOCATION_TTL_SECONDS", defaults.revocation_ttl),
            key_prefix: std::env::var("TOKEN_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            store_timeout_ms: env_parse("TOKEN_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            fail_open: env_parse("TOKEN_FAIL_OPEN", defaults.fail_open),
            max_token_age: std::env::var("TOKEN_MAX_AGE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Set token lifetime in days
    pub fn with_lifetime_days(mut self, days: i64) -> Self {
        self.token_lifetime = days.saturating_mul(86400);
        self
    }

    /// Set the revocation marker TTL in seconds
    pub fn with_revocation_ttl(mut self, seconds: u64) -> Self {
        self.revocation_ttl = seconds;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_token_lifetime() -> i64 {
    604800 // 7 days
}

fn default_revocation_ttl() -> u64 {
    604800 // 7 days, matches the default lifetime
}

fn default_key_prefix() -> String {
    String::from("token:revoked")
}

fn default_store_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert!(config.is_using_default_secret());
        assert_eq!(config.token_lifetime, 604800);
        assert_eq!(config.revocation_ttl, 604800);
        assert_eq!(config.key_prefix, "token:revoked");
        assert!(!config.fail_open);
        assert!(config.max_token_age.is_none());
    }

    #[test]
    fn test_token_config_builders() {
        let config = TokenConfig::new("k1")
            .with_lifetime_days(1)
            .with_revocation_ttl(120);
        assert!(!config.is_using_default_secret());
        assert_eq!(config.token_lifetime, 86400);
        assert_eq!(config.revocation_ttl, 120);
    }

    #[test]
    fn test_lifetime_days_saturates() {
        let config = TokenConfig::default().with_lifetime_days(i64::MAX);
        assert_eq!(config.token_lifetime, i64::MAX);

        let config = TokenConfig::default().with_lifetime_days(i64::MIN);
        assert_eq!(config.token_lifetime, i64::MIN);
    }

    #[test]
    fn test_token_config_partial_deserialize() {
        let config: TokenConfig =
            serde_json::from_str(r#"{"secret":"abc","fail_open":true}"#).unwrap();
        assert_eq!(config.secret, "abc");
        assert!(config.fail_open);
        assert_eq!(config.store_timeout_ms, 2000);
    }
}
