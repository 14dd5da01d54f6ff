//! Revocation store trait defining the denylist capability the token service
//! depends on.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::StoreError;

/// Key-value store with TTL-based expiry used as a token denylist
///
/// The token service only cares whether a revocation key exists; values are
/// opaque markers. Implementations must provide single-key linearizability,
/// in particular for [`set_if_absent`](RevocationStore::set_if_absent), which
/// is the serialization point of token refresh.
///
/// # Failure semantics
/// - An expired key and a key that was never set are indistinguishable: both
///   report `false` from `has`.
/// - Backend unavailability is reported as `Err(StoreError)`, never folded
///   into `false`. The caller decides whether that means fail-open or
///   fail-closed.
///
/// # Example
/// ```no_run
/// # use std::time::Duration;
/// # use st_core::repositories::{MemoryRevocationStore, RevocationStore};
/// # async fn example() -> Result<(), st_core::StoreError> {
/// let store = MemoryRevocationStore::new();
/// store.set("token:revoked:abc:def", "1700000000", Duration::from_secs(60)).await?;
/// assert!(store.has("token:revoked:abc:def").await?);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Create or overwrite `key` with `value`, expiring after `ttl`
    ///
    /// Overwriting an existing key with a shorter TTL is allowed.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Create `key` only if it does not exist yet
    ///
    /// # Returns
    /// * `Ok(true)` - This call created the key
    /// * `Ok(false)` - The key already existed and was left untouched
    /// * `Err(StoreError)` - The store could not confirm either outcome
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Check whether `key` exists and has not expired
    async fn has(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
