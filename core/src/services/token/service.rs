//! Main token service implementation

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::Payload;
use crate::errors::{ConfigError, StoreError, TokenError, TokenResult};
use crate::repositories::RevocationStore;

use super::codec::{hex_digest, TokenCodec};
use super::config::{RevocationCheckPolicy, TokenServiceConfig};

/// Service issuing, verifying, refreshing and revoking session tokens
///
/// Codec work is synchronous and lock-free. Every operation that consults the
/// revocation store is `async` and bounded by `store_timeout`.
pub struct TokenService<S: RevocationStore + ?Sized> {
    codec: TokenCodec,
    store: Arc<S>,
    config: TokenServiceConfig,
}

impl<S: RevocationStore + ?Sized> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Revocation store shared with other services
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService` instance or error if the configuration is invalid
    pub fn new(store: Arc<S>, config: TokenServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let codec = TokenCodec::new(config.secret.as_bytes())?;

        debug!(
            "Token service created (prefix: {}, revocation ttl: {}s, policy: {:?})",
            config.key_prefix,
            config.revocation_ttl.as_secs(),
            config.revocation_check
        );

        Ok(Self {
            codec,
            store,
            config,
        })
    }

    /// Returns the service configuration
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Returns the codec used by this service
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Derives the revocation key of `token`
    ///
    /// `<prefix>:<sha256(signing key)>:<sha256(token)>`, so neither the raw
    /// token nor the key ends up in the store.
    pub fn revocation_key(&self, token: &str) -> String {
        format!(
            "{}:{}:{}",
            self.config.key_prefix,
            self.codec.key_digest(),
            hex_digest(token)
        )
    }

    /// Encodes a caller-built payload into a signed token
    pub fn encode(&self, payload: &Payload) -> TokenResult<String> {
        self.codec.encode(payload)
    }

    /// Issues a token for `user_id`, valid for `lifetime` or the configured
    /// default
    pub fn issue(&self, user_id: i64, lifetime: Option<Duration>) -> TokenResult<String> {
        self.issue_at(user_id, lifetime, unix_now())
    }

    /// Issues a token as of `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        lifetime: Option<Duration>,
        now: i64,
    ) -> TokenResult<String> {
        let lifetime = lifetime.unwrap_or(self.config.token_lifetime);
        let payload = Payload::issue(user_id, now, duration_secs(lifetime));
        self.codec.encode(&payload)
    }

    /// Verifies a token and returns its payload
    ///
    /// # Returns
    ///
    /// * `Ok(Payload)` - Valid, unexpired and not revoked
    /// * `Err(TokenError)` - Malformed, forged, expired, revoked, or the
    ///   revocation state could not be determined under the fail-closed policy
    pub async fn decode(&self, token: &str) -> TokenResult<Payload> {
        self.decode_at(token, unix_now()).await
    }

    /// Verifies a token as of `now`
    pub async fn decode_at(&self, token: &str, now: i64) -> TokenResult<Payload> {
        let payload = self.codec.decode(token, now)?;
        self.check_max_age(&payload, now)?;
        self.check_revocation(token).await?;
        Ok(payload)
    }

    /// Replaces a valid token with a new one and revokes the old one
    ///
    /// # Arguments
    ///
    /// * `old_token` - Token being refreshed; must decode successfully
    /// * `new_lifetime` - Lifetime of the new token
    /// * `revocation_ttl` - TTL of the old token's revocation marker, the
    ///   configured default when `None`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The new token; the old one is revoked
    /// * `Err(TokenError)` - Refresh failed; the old token was not revoked by
    ///   this call and no new token is handed out
    pub async fn refresh(
        &self,
        old_token: &str,
        new_lifetime: Duration,
        revocation_ttl: Option<Duration>,
    ) -> TokenResult<String> {
        self.refresh_at(old_token, new_lifetime, revocation_ttl, unix_now())
            .await
    }

    /// Refreshes a token as of `now`
    pub async fn refresh_at(
        &self,
        old_token: &str,
        new_lifetime: Duration,
        revocation_ttl: Option<Duration>,
        now: i64,
    ) -> TokenResult<String> {
        let old_payload = self.decode_at(old_token, now).await?;
        let user_id = old_payload.user_info.id;

        let new_payload = Payload::issue(user_id, now, duration_secs(new_lifetime));
        let new_token = self.codec.encode(&new_payload)?;

        // The claim is the only serialization point between concurrent
        // refreshes of the same token.
        let key = self.revocation_key(old_token);
        let ttl = self.marker_ttl(revocation_ttl);
        let claimed = self
            .with_timeout(self.store.set_if_absent(&key, &now.to_string(), ttl))
            .await
            .map_err(|e| {
                error!("Failed to revoke refreshed token for user {}: {}", user_id, e);
                TokenError::RevocationStoreFailure(e)
            })?;

        if !claimed {
            warn!(
                "Token for user {} was revoked concurrently, discarding refreshed token",
                user_id
            );
            return Err(TokenError::Revoked);
        }

        info!(
            "Token refreshed for user {} (new expiry: {}, marker ttl: {}s)",
            user_id,
            new_payload.exp,
            ttl.as_secs()
        );
        Ok(new_token)
    }

    /// Revokes a token, e.g. on logout
    ///
    /// The token must carry a valid signature and must not be expired;
    /// revoking an already revoked token refreshes its marker.
    pub async fn revoke(&self, token: &str, ttl: Option<Duration>) -> TokenResult<()> {
        self.revoke_at(token, ttl, unix_now()).await
    }

    /// Revokes a token as of `now`
    pub async fn revoke_at(&self, token: &str, ttl: Option<Duration>, now: i64) -> TokenResult<()> {
        let payload = self.codec.decode(token, now)?;
        let key = self.revocation_key(token);
        let ttl = self.marker_ttl(ttl);

        self.with_timeout(self.store.set(&key, &now.to_string(), ttl))
            .await
            .map_err(|e| {
                error!("Failed to revoke token for user {}: {}", payload.user_info.id, e);
                TokenError::RevocationStoreFailure(e)
            })?;

        info!("Token revoked for user {}", payload.user_info.id);
        Ok(())
    }

    /// Checks whether a revocation marker exists for `token`
    ///
    /// The token itself is not verified.
    pub async fn is_revoked(&self, token: &str) -> TokenResult<bool> {
        let key = self.revocation_key(token);
        Ok(self.with_timeout(self.store.has(&key)).await?)
    }

    /// Removes the revocation marker of `token`; a token without a marker is
    /// left as is
    pub async fn reinstate(&self, token: &str) -> TokenResult<()> {
        let key = self.revocation_key(token);
        self.with_timeout(self.store.delete(&key)).await?;
        debug!("Revocation marker removed: {}", key);
        Ok(())
    }

    fn check_max_age(&self, payload: &Payload, now: i64) -> TokenResult<()> {
        match self.config.max_token_age {
            Some(max_age) if payload.age_at(now) >= duration_secs(max_age) => {
                debug!(
                    "Token for user {} exceeded maximum age of {}s",
                    payload.user_info.id,
                    max_age.as_secs()
                );
                Err(TokenError::Expired)
            }
            _ => Ok(()),
        }
    }

    async fn check_revocation(&self, token: &str) -> TokenResult<()> {
        let key = self.revocation_key(token);

        match self.with_timeout(self.store.has(&key)).await {
            Ok(false) => Ok(()),
            Ok(true) => {
                debug!("Rejected revoked token: {}", key);
                Err(TokenError::Revoked)
            }
            Err(e) => match self.config.revocation_check {
                RevocationCheckPolicy::FailClosed => {
                    error!("Revocation check failed, rejecting token: {}", e);
                    Err(TokenError::RevocationStoreFailure(e))
                }
                RevocationCheckPolicy::FailOpen => {
                    warn!("Revocation check failed, accepting token: {}", e);
                    Ok(())
                }
            },
        }
    }

    fn marker_ttl(&self, requested: Option<Duration>) -> Duration {
        requested
            .filter(|ttl| ttl.as_secs() > 0)
            .unwrap_or(self.config.revocation_ttl)
    }

    async fn with_timeout<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let limit = self.config.store_timeout;
        tokio::time::timeout(limit, operation)
            .await
            .unwrap_or_else(|_| {
                Err(StoreError::Timeout {
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

fn duration_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
