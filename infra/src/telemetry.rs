//! Tracing subscriber initialisation

use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

use st_shared::config::{LogFormat, LoggingConfig};

/// Errors raised while installing the global subscriber
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed
    #[error("Invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// A global subscriber is already installed
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(filter_directive(config))?;
    let registry = tracing_subscriber::registry().with(filter);

    let base = fmt::layer()
        .with_target(true)
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => set_global_default(registry.with(base.json()))?,
        LogFormat::Pretty => set_global_default(registry.with(base.pretty()))?,
        LogFormat::Compact => set_global_default(registry.with(base.compact()))?,
    }

    Ok(())
}

fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}
