//! Configuration module with concern-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `token` - Token signing, lifetimes and revocation settings
//! - `cache` - Redis configuration for the revocation store
//! - `environment` - Environment detection and logging configuration

pub mod cache;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use token::TokenConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token configuration
    pub token: TokenConfig,

    /// Revocation store (Redis) configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            token: TokenConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            token: TokenConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            token: TokenConfig::new("use-env-variable"),
            cache: CacheConfig::new("redis://redis:6379").with_retries(3, 150),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };
        config.token = TokenConfig::from_env();
        config.cache = CacheConfig::from_env();
        config
    }
}
