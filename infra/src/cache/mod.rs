//! Cache module for Redis-based storage
//!
//! Provides the Redis client with retry logic and the Redis implementation
//! of the token revocation store.

pub mod redis_client;
pub mod revocation_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use revocation_store::RedisRevocationStore;

// Re-export commonly used types
pub use st_shared::config::cache::CacheConfig;
