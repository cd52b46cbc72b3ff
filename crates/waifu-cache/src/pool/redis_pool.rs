//! Redis connection pool using deadpool-redis.
//!
//! Entries are stored as plain string keys `waifu:<namespace>:<key>` so each
//! one gets its own `EX` expiry; namespaces are enumerated with `SCAN`.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

use crate::backend::{CacheBackend, CacheError, CacheResult};

/// Prefix for every key written by this service
const KEY_PREFIX: &str = "waifu";

/// Keys requested per `SCAN` round trip
const SCAN_COUNT: usize = 200;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&waifu_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &waifu_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool with the given configuration
    pub fn new(config: RedisPoolConfig) -> CacheResult<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| CacheError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CacheError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Create a new Redis pool from waifu-common config
    pub fn from_config(config: &waifu_common::RedisConfig) -> CacheResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// Get a connection from the pool
    pub async fn get_conn(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(CacheError::GetConnection)
    }

    /// Get the current pool status
    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> CacheResult<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Full Redis key for an entry
    fn entry_key(namespace: &str, key: &str) -> String {
        format!("{KEY_PREFIX}:{namespace}:{key}")
    }

    /// Prefix shared by all entries of a namespace
    fn namespace_prefix(namespace: &str) -> String {
        format!("{KEY_PREFIX}:{namespace}:")
    }

    /// Scan all Redis keys of a namespace using cursor-based iteration.
    async fn scan_namespace(&self, namespace: &str) -> CacheResult<Vec<String>> {
        let pattern = format!("{}*", escape_glob(&Self::namespace_prefix(namespace)));
        let mut conn = self.get_conn().await?;
        let mut cursor: u64 = 0;
        let mut all_keys = Vec::new();

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            all_keys.extend(keys);
            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        all_keys.sort_unstable();
        all_keys.dedup();
        Ok(all_keys)
    }
}

/// Escape Redis glob metacharacters so ids are matched literally
fn escape_glob(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '^' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheBackend for RedisPool {
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let secs = ttl.as_secs();
        if secs == 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let mut conn = self.get_conn().await?;
        conn.set_ex::<_, _, ()>(Self::entry_key(namespace, key), value, secs)
            .await?;
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(Self::entry_key(namespace, key)).await?;
        Ok(value)
    }

    async fn delete(&self, namespace: &str, key: &str) -> CacheResult<bool> {
        let mut conn = self.get_conn().await?;
        let deleted: i32 = conn.del(Self::entry_key(namespace, key)).await?;
        Ok(deleted > 0)
    }

    async fn entries(&self, namespace: &str) -> CacheResult<Vec<(String, String)>> {
        let keys = self.scan_namespace(namespace).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn().await?;
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let prefix = Self::namespace_prefix(namespace);
        // Entries that expired between SCAN and MGET come back as nil
        Ok(keys
            .into_iter()
            .zip(values)
            .filter_map(|(full_key, value)| {
                let key = full_key.strip_prefix(&prefix)?.to_string();
                value.map(|v| (key, v))
            })
            .collect())
    }

    async fn keys(&self, namespace: &str) -> CacheResult<Vec<String>> {
        let prefix = Self::namespace_prefix(namespace);
        Ok(self
            .scan_namespace(namespace)
            .await?
            .into_iter()
            .filter_map(|full_key| full_key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}
