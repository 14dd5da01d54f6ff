//! Environment configuration module

use serde::{Deserialize, Serialize};
use std::env;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    Development,
    /// Staging/test environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get environment from ENV variable
    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| String::from("development"))
            .parse()
            .unwrap_or(Environment::Development)
    }

    /// Get the configuration file stem for this environment
    pub fn config_file(&self) -> &str {
        match self {
            Environment::Development => "config.development",
            Environment::Staging => "config.staging",
            Environment::Production => "config.production",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Enable colored output (terminal only)
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Include source location in logs
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: default_log_format(),
            colored: default_colored(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config for environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                colored: true,
                source_location: true,
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
            Environment::Production => Self {
                level: String::from("warn"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
        }
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_colored() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("invalid".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_properties() {
        let dev = Environment::Development;
        assert!(!dev.is_production());
        assert_eq!(dev.config_file(), "config.development");
        assert_eq!(dev.to_string(), "development");

        let prod = Environment::Production;
        assert!(prod.is_production());
        assert_eq!(prod.config_file(), "config.production");
    }

    #[test]
    fn test_logging_config_for_environment() {
        let dev_log = LoggingConfig::for_environment(Environment::Development);
        assert_eq!(dev_log.level, "debug");
        assert!(dev_log.colored);
        assert!(dev_log.source_location);

        let prod_log = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod_log.level, "warn");
        assert_eq!(prod_log.format, LogFormat::Json);
        assert!(!prod_log.colored);
    }
}
