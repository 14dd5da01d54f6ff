//! Redis cache client implementation
//!
//! Multiplexed async Redis connection with retry logic and the handful of
//! commands the revocation store needs: plain and conditional `SET` with
//! expiry, `GET`, `EXISTS`, `DEL` and a `PING` health check.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use st_shared::config::cache::MAX_RETRY_DELAY_MS;
use st_shared::config::CacheConfig;

use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache client with connection multiplexing and retry logic
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    /// Maximum number of attempts for a single operation
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
    /// Upper bound for a single attempt
    response_timeout: Duration,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use st_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_retries(5, 200);
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let url = config.connection_url();
        info!("Creating Redis client with URL: {}", mask_url(&url));

        let client = Client::open(url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = config.max_retries.max(1);
        let connection = Self::create_connection_with_retry(
            client,
            max_retries,
            config.retry_delay_ms,
            Duration::from_secs(config.connection_timeout),
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            max_retries,
            retry_delay_ms: config.retry_delay_ms,
            response_timeout: Duration::from_millis(config.response_timeout_ms),
        })
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        connection_timeout: Duration,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = with_deadline(connection_timeout, client.get_multiplexed_async_connection()).await;

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value with expiration time
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to store
    /// * `expiry_seconds` - Time to live in seconds, at least one
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Set a value with expiration time only if the key does not exist
    ///
    /// Runs `SET key value NX EX seconds`, a single atomic command. The
    /// command may be retried after a lost reply, so `value` must be unique
    /// per claim: a nil reply is resolved by reading the key back.
    ///
    /// # Returns
    /// * `Ok(true)` - The key was written by this call
    /// * `Ok(false)` - The key already existed and was left unchanged
    pub async fn set_nx_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        debug!("Claiming key '{}' with expiry {}s", key, expiry_seconds);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();
                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("EX")
                        .arg(expiry_seconds)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                })
            })
            .await;

        let reply = result.map_err(|e| {
            error!("Failed to claim key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })?;

        let written = confirm_claim(reply, value, || self.get(key)).await?;
        debug!("Claim of key '{}' written: {}", key, written);
        Ok(written)
    }

    /// Get a value from cache
    ///
    /// # Returns
    /// * `Result<Option<String>, InfrastructureError>` - Stored value or None if
    ///   not found or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await;

        match result {
            Ok(deleted_count) => {
                let deleted = deleted_count > 0;
                if deleted {
                    debug!("Successfully deleted key '{}'", key);
                } else {
                    debug!("Key '{}' was not found", key);
                }
                Ok(deleted)
            }
            Err(e) => {
                error!("Failed to delete key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to check key '{}' existence: {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Each attempt is bounded by the response timeout; transient failures
    /// are retried with exponential backoff.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match with_deadline(self.response_timeout, operation(conn)).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Awaits `operation`, turning an elapsed deadline into an IO timeout error
async fn with_deadline<T>(
    deadline: Duration,
    operation: impl Future<Output = RedisResult<T>>,
) -> RedisResult<T> {
    if deadline.is_zero() {
        return operation.await;
    }
    match timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(RedisError::from(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("no response within {}ms", deadline.as_millis()),
        ))),
    }
}

/// Resolves a `SET NX` reply into "written by this caller"
///
/// A nil reply is ambiguous once an attempt has been retried: the earlier
/// attempt may have committed before its reply was lost. The key counts as
/// ours when it holds `value`.
pub(crate) async fn confirm_claim<F, Fut>(
    reply: Option<String>,
    value: &str,
    read_back: F,
) -> Result<bool, InfrastructureError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<String>, InfrastructureError>>,
{
    if reply.is_some() {
        return Ok(true);
    }
    let current = read_back().await?;
    Ok(current.as_deref() == Some(value))
}

/// Doubles the backoff delay, capped at 5 seconds
pub(crate) fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY_MS)
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            if proto_end < at_pos {
                let proto = &url[..proto_end + 3];
                let host_part = &url[at_pos..];
                return format!("{}****{}", proto, host_part);
            }
        }
    }
    url.to_string()
}
