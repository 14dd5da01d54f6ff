//! # Infrastructure Layer
//!
//! Concrete adapters behind the session token core:
//! - **Cache**: Redis client and the Redis-backed revocation store
//! - **Configuration**: layered loading of [`AppConfig`] from files and the
//!   environment
//! - **Telemetry**: tracing subscriber initialisation

use st_core::errors::StoreError;
use st_shared::config::{AppConfig, Environment};

/// Cache module - Redis client and revocation store
pub mod cache;

/// Telemetry module - tracing subscriber setup
pub mod telemetry;

/// Load application configuration
///
/// Sources, lowest precedence first:
/// - built-in defaults for the detected environment
/// - optional `config.<environment>.toml` in the working directory
/// - `APP__*` environment variables, e.g. `APP__TOKEN__SECRET`
///
/// A `.env` file is loaded into the process environment first if present.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let defaults = AppConfig::from_env();
    load_config_for(defaults.environment, defaults)
}

/// Load configuration layered over `defaults` for a given environment
pub fn load_config_for(
    environment: Environment,
    defaults: AppConfig,
) -> Result<AppConfig, InfrastructureError> {
    let settings = ::config::Config::builder()
        .add_source(::config::Config::try_from(&defaults)?)
        .add_source(::config::File::with_name(environment.config_file()).required(false))
        .add_source(
            ::config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;

    if config.token.is_using_default_secret() {
        if environment.is_production() {
            return Err(InfrastructureError::Config(
                "token secret must be set in production".to_string(),
            ));
        }
        tracing::warn!("Using the default token secret, set APP__TOKEN__SECRET or TOKEN_SECRET");
    }

    let retry_budget = config.cache.retry_budget();
    if u128::from(config.token.store_timeout_ms) <= retry_budget.as_millis() {
        tracing::warn!(
            "Token store timeout {}ms does not cover the Redis retry budget {}ms, retries will be cut short",
            config.token.store_timeout_ms,
            retry_budget.as_millis()
        );
    }

    tracing::debug!("Configuration loaded for {} environment", environment);
    Ok(config)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// Tracing subscriber setup error
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] telemetry::TelemetryError),
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(e)
                if e.is_io_error()
                    || e.is_connection_refusal()
                    || e.is_connection_dropped()
                    || e.is_timeout() =>
            {
                StoreError::Unavailable {
                    message: e.to_string(),
                }
            }
            other => StoreError::Backend {
                message: other.to_string(),
            },
        }
    }
}
