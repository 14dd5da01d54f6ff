//! Redis-backed revocation store
//!
//! Revocation markers are plain string keys with a Redis expiry, so Redis
//! evicts them on its own once the token they guard could no longer verify.
//! Values written by `set_if_absent` carry a per-claim suffix.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use st_core::errors::StoreError;
use st_core::repositories::RevocationStore;
use st_shared::config::CacheConfig;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// [`RevocationStore`] over a shared [`RedisClient`]
#[derive(Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    /// Wraps an existing client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to Redis with `config` and wraps the resulting client
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(config).await?;
        Ok(Self::new(client))
    }

    /// Underlying Redis client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Pings Redis
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        self.client.health_check().await
    }
}

/// Makes a claim value unique per call so a retried `SET NX` can recognise
/// its own earlier write
fn claim_marker(value: &str) -> String {
    format!("{}:{}", value, Uuid::new_v4().simple())
}

/// Redis expiries are whole seconds and `EX 0` is rejected
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.client
            .set_with_expiry(key, value, expiry_seconds(ttl))
            .await
            .map_err(StoreError::from)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let marker = claim_marker(value);
        let written = self
            .client
            .set_nx_with_expiry(key, &marker, expiry_seconds(ttl))
            .await?;
        if !written {
            debug!("Revocation key already present: {}", key);
        }
        Ok(written)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.client.get(key).await?)
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.exists(key).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client.delete(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_seconds_rounds_down_with_floor() {
        assert_eq!(expiry_seconds(Duration::from_secs(3600)), 3600);
        assert_eq!(expiry_seconds(Duration::from_millis(1500)), 1);
        assert_eq!(expiry_seconds(Duration::from_millis(200)), 1);
        assert_eq!(expiry_seconds(Duration::ZERO), 1);
    }

    #[test]
    fn test_claim_markers_are_unique() {
        let first = claim_marker("1700000000");
        let second = claim_marker("1700000000");

        assert!(first.starts_with("1700000000:"));
        assert_ne!(first, second);
    }
}
