//! In-memory implementation of RevocationStore for tests and single-process
//! deployments

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::StoreError;

use super::store::RevocationStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Minimum time between two sweeps triggered by writes
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    last_sweep: Instant,
}

impl Entries {
    /// Removes expired entries, returning how many were dropped
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        self.last_sweep = now;
        before - self.map.len()
    }

    /// Sweeps if the last sweep is older than [`SWEEP_INTERVAL`]
    fn sweep_if_due(&mut self, now: Instant) {
        if now.duration_since(self.last_sweep) >= SWEEP_INTERVAL {
            let removed = self.sweep(now);
            if removed > 0 {
                debug!("Evicted {} expired revocation entries", removed);
            }
        }
    }
}

/// TTL-honouring in-memory revocation store
///
/// Expired entries are hidden from reads immediately and evicted by the next
/// write once [`SWEEP_INTERVAL`] has passed since the previous sweep.
/// Cloning yields a handle to the same map.
#[derive(Debug, Clone)]
pub struct MemoryRevocationStore {
    entries: Arc<RwLock<Entries>>,
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }
}

impl MemoryRevocationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries and return how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        entries.sweep(Instant::now())
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        let now = Instant::now();
        entries.map.values().filter(|entry| entry.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.sweep_if_due(now);
        entries.map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.sweep_if_due(now);

        if entries.map.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }

        entries.map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries.map.get(key).is_some_and(|entry| entry.is_live(now)))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.map.remove(key);
        Ok(())
    }
}
