//! Cache configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cap of the exponential backoff between attempts
pub const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis configuration for the revocation store
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Upper bound for a single command attempt in milliseconds
    pub response_timeout_ms: u64,

    /// Maximum number of attempts for a single operation
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (exponential backoff)
    pub retry_delay_ms: u64,

    /// Redis database number (0-15)
    pub database: u8,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            response_timeout_ms: 500,
            max_retries: 3,
            retry_delay_ms: 100,
            database: 0,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let max_retries = std::env::var("REDIS_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .unwrap_or(3);

        Self {
            url,
            max_retries,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set retry attempts and base delay
    pub fn with_retries(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the database number
    pub fn with_database(mut self, db: u8) -> Self {
        self.database = db.min(15);
        self
    }

    /// Worst-case time a single client operation can take: every attempt
    /// running into the response timeout plus the backoff between attempts
    ///
    /// Callers bounding store calls with their own timeout should allow at
    /// least this much, or the client's retries never get to run.
    pub fn retry_budget(&self) -> Duration {
        let attempts = self.max_retries.max(1);
        let mut total = self.response_timeout_ms.saturating_mul(u64::from(attempts));
        let mut delay = self.retry_delay_ms;
        for _ in 1..attempts {
            total = total.saturating_add(delay);
            delay = delay.saturating_mul(2).min(MAX_RETRY_DELAY_MS);
        }
        Duration::from_millis(total)
    }

    /// Connection URL with the database number applied
    ///
    /// A URL that already selects a database in its path is returned as is.
    pub fn connection_url(&self) -> String {
        if self.database == 0 {
            return self.url.clone();
        }

        let (base, query) = match self.url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.url.as_str(), None),
        };
        let authority_start = base.find("://").map_or(0, |pos| pos + 3);
        let has_path = base[authority_start..]
            .split_once('/')
            .is_some_and(|(_, path)| !path.is_empty());
        if has_path {
            return self.url.clone();
        }

        let mut url = format!("{}/{}", base.trim_end_matches('/'), self.database);
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}
