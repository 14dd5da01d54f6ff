//! Configuration for the token service

use std::fmt;
use std::time::Duration;

use st_shared::config::TokenConfig;

use crate::errors::ConfigError;

/// What to do when the revocation store cannot answer during decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationCheckPolicy {
    /// Reject the token with `RevocationStoreFailure`
    #[default]
    FailClosed,
    /// Accept the token and log a warning
    FailOpen,
}

/// Configuration for the token service
///
/// Immutable once the service is constructed.
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Token signing secret
    pub secret: String,
    /// Lifetime of tokens minted by `issue`
    pub token_lifetime: Duration,
    /// Default TTL of revocation markers; must cover the longest token
    /// lifetime plus clock skew
    pub revocation_ttl: Duration,
    /// Namespace prefix of revocation keys
    pub key_prefix: String,
    /// Upper bound for a single revocation store call
    pub store_timeout: Duration,
    /// Policy for store failures during decode
    pub revocation_check: RevocationCheckPolicy,
    /// Reject tokens older than this, measured from their issued-at time
    pub max_token_age: Option<Duration>,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&TokenConfig::default())
    }
}

impl From<&TokenConfig> for TokenServiceConfig {
    fn from(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            token_lifetime: Duration::from_secs(config.token_lifetime.max(0) as u64),
            revocation_ttl: Duration::from_secs(config.revocation_ttl),
            key_prefix: config.key_prefix.clone(),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            revocation_check: if config.fail_open {
                RevocationCheckPolicy::FailOpen
            } else {
                RevocationCheckPolicy::FailClosed
            },
            max_token_age: config.max_token_age.map(Duration::from_secs),
        }
    }
}

impl TokenServiceConfig {
    /// Creates a configuration with `secret` and default settings
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Checks the values the service relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "token_lifetime",
                reason: "must be greater than zero",
            });
        }
        // Redis rejects EX 0 and sub-second TTLs round down to it
        if self.revocation_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "revocation_ttl",
                reason: "must be at least one second",
            });
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "store_timeout",
                reason: "must be greater than zero",
            });
        }
        if self.key_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "key_prefix",
                reason: "must not be empty",
            });
        }
        if self.max_token_age.is_some_and(|age| age.is_zero()) {
            return Err(ConfigError::InvalidValue {
                field: "max_token_age",
                reason: "must be greater than zero when set",
            });
        }
        Ok(())
    }
}

impl fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("secret", &"***")
            .field("token_lifetime", &self.token_lifetime)
            .field("revocation_ttl", &self.revocation_ttl)
            .field("key_prefix", &self.key_prefix)
            .field("store_timeout", &self.store_timeout)
            .field("revocation_check", &self.revocation_check)
            .field("max_token_age", &self.max_token_age)
            .finish()
    }
}
