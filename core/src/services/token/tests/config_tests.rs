use std::time::Duration;

use st_shared::config::TokenConfig;

use crate::errors::ConfigError;
use crate::repositories::MemoryRevocationStore;
use crate::services::token::{RevocationCheckPolicy, TokenService, TokenServiceConfig};

use super::mocks::{test_config, SECRET};

fn invalid_field(config: &TokenServiceConfig) -> Option<&'static str> {
    match config.validate() {
        Err(ConfigError::InvalidValue { field, .. }) => Some(field),
        _ => None,
    }
}

#[test]
fn test_default_config_is_valid() {
    let config = TokenServiceConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.token_lifetime, Duration::from_secs(604800));
    assert_eq!(config.revocation_ttl, Duration::from_secs(604800));
    assert_eq!(config.key_prefix, "token:revoked");
    assert_eq!(config.store_timeout, Duration::from_millis(2000));
    assert_eq!(config.revocation_check, RevocationCheckPolicy::FailClosed);
    assert!(config.max_token_age.is_none());
}

#[test]
fn test_empty_secret_rejected() {
    let config = TokenServiceConfig::new("");
    assert_eq!(config.validate(), Err(ConfigError::EmptySecret));

    let result = TokenService::new(std::sync::Arc::new(MemoryRevocationStore::new()), config);
    assert!(matches!(result, Err(ConfigError::EmptySecret)));
}

#[test]
fn test_zero_values_rejected() {
    let mut config = test_config();
    config.token_lifetime = Duration::ZERO;
    assert_eq!(invalid_field(&config), Some("token_lifetime"));

    let mut config = test_config();
    config.revocation_ttl = Duration::from_millis(500);
    assert_eq!(invalid_field(&config), Some("revocation_ttl"));

    let mut config = test_config();
    config.store_timeout = Duration::ZERO;
    assert_eq!(invalid_field(&config), Some("store_timeout"));

    let mut config = test_config();
    config.key_prefix = String::new();
    assert_eq!(invalid_field(&config), Some("key_prefix"));

    let mut config = test_config();
    config.max_token_age = Some(Duration::ZERO);
    assert_eq!(invalid_field(&config), Some("max_token_age"));
}

#[test]
fn test_from_token_config() {
    let mut settings = TokenConfig::new(SECRET)
        .with_lifetime_days(1)
        .with_revocation_ttl(7200);
    settings.key_prefix = "app:revoked".to_string();
    settings.store_timeout_ms = 150;
    settings.fail_open = true;
    settings.max_token_age = Some(2_592_000);

    let config = TokenServiceConfig::from(&settings);
    assert_eq!(config.secret, SECRET);
    assert_eq!(config.token_lifetime, Duration::from_secs(86400));
    assert_eq!(config.revocation_ttl, Duration::from_secs(7200));
    assert_eq!(config.key_prefix, "app:revoked");
    assert_eq!(config.store_timeout, Duration::from_millis(150));
    assert_eq!(config.revocation_check, RevocationCheckPolicy::FailOpen);
    assert_eq!(config.max_token_age, Some(Duration::from_secs(2_592_000)));
}

#[test]
fn test_negative_lifetime_becomes_invalid() {
    let mut settings = TokenConfig::new(SECRET);
    settings.token_lifetime = -5;

    let config = TokenServiceConfig::from(&settings);
    assert_eq!(invalid_field(&config), Some("token_lifetime"));
}

#[test]
fn test_debug_redacts_secret() {
    let config = TokenServiceConfig::new("super-secret-value");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("super-secret-value"));
    assert!(debug.contains("***"));
}
