//! In-memory cache with per-entry deadlines.
//!
//! Used when no Redis URL is configured and throughout the test suites.
//! Expired entries are invisible to readers. A namespace drops its expired
//! entries whenever it is written or listed, and [`MemoryCache::spawn_sweeper`]
//! clears namespaces nobody touches any more.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::backend::{CacheBackend, CacheError, CacheResult};

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

/// Namespaced in-memory cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    namespaces: DashMap<String, DashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries and empty namespaces
    pub fn purge_expired(&self) {
        let now = Instant::now();
        for ns in self.namespaces.iter() {
            ns.retain(|_, entry| entry.is_live(now));
        }
        self.namespaces.retain(|_, ns| !ns.is_empty());
    }

    /// Purge expired entries every `every` until the cache is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let before = cache.stored();
                cache.purge_expired();
                tracing::trace!(purged = before.saturating_sub(cache.stored()), "Swept memory cache");
            }
        })
    }

    /// Number of entries held, expired or not
    fn stored(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.len()).sum()
    }

    /// Number of live entries across all namespaces
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.namespaces
            .iter()
            .map(|ns| ns.iter().filter(|e| e.is_live(now)).count())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        let ns = self.namespaces.entry(namespace.to_string()).or_default();
        ns.retain(|_, held| held.is_live(now));
        ns.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let Some(ns) = self.namespaces.get(namespace) else {
            return Ok(None);
        };
        let value = ns
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());
        if value.is_none() {
            ns.remove_if(key, |_, entry| !entry.is_live(now));
        }
        Ok(value)
    }

    async fn delete(&self, namespace: &str, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.remove(key))
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn entries(&self, namespace: &str) -> CacheResult<Vec<(String, String)>> {
        let now = Instant::now();
        Ok(self
            .namespaces
            .get(namespace)
            .map(|ns| {
                ns.retain(|_, entry| entry.is_live(now));
                ns.iter()
                    .map(|e| (e.key().clone(), e.value().value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn keys(&self, namespace: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        Ok(self
            .namespaces
            .get(namespace)
            .map(|ns| {
                ns.retain(|_, entry| entry.is_live(now));
                ns.iter().map(|e| e.key().clone()).collect()
            })
            .unwrap_or_default())
    }
}
