//! Cache backend capability.
//!
//! A namespaced key-value store where every entry carries its own expiry.
//! Enumeration returns a finite snapshot of the live entries; callers must
//! not rely on any ordering.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Error type for cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid TTL: {0:?}")]
    InvalidTtl(Duration),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store a value, replacing any previous one and restarting its TTL
    async fn set(&self, namespace: &str, key: &str, value: &str, ttl: Duration)
        -> CacheResult<()>;

    /// Get a live value
    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>>;

    /// Delete a value; returns whether it existed
    async fn delete(&self, namespace: &str, key: &str) -> CacheResult<bool>;

    /// All live `(key, value)` pairs in a namespace
    async fn entries(&self, namespace: &str) -> CacheResult<Vec<(String, String)>>;

    /// All live keys in a namespace
    async fn keys(&self, namespace: &str) -> CacheResult<Vec<String>>;
}

/// Cache backend shared between stores
pub type SharedCache = Arc<dyn CacheBackend>;
