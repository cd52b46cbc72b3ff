//! Service context - dependency container for services
//!
//! Holds the process-scoped state (rosters, relationships, random source)
//! and the cache-backed member directory. Created once at start and shared
//! by every event handler.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use waifu_cache::{MemberDirectory, SharedCache};
use waifu_common::WaifuConfig;

use super::error::{ServiceError, ServiceResult};
use super::relationship::RelationshipTable;
use super::roster::RosterStore;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Cache-backed
    directory: MemberDirectory,

    // Process-scoped state
    rosters: Arc<RosterStore>,
    relationships: Arc<RelationshipTable>,
    rng: Arc<Mutex<StdRng>>,

    config: Arc<WaifuConfig>,
}

impl ServiceContext {
    /// Create a new service context with fresh in-process state
    pub fn new(cache: SharedCache, config: WaifuConfig, rng: StdRng) -> Self {
        Self {
            directory: MemberDirectory::new(cache),
            rosters: Arc::new(RosterStore::new()),
            relationships: Arc::new(RelationshipTable::new()),
            rng: Arc::new(Mutex::new(rng)),
            config: Arc::new(config),
        }
    }

    /// Get the member directory
    pub fn directory(&self) -> &MemberDirectory {
        &self.directory
    }

    /// Get the in-process roster store
    pub fn rosters(&self) -> &RosterStore {
        self.rosters.as_ref()
    }

    /// Get the relationship table
    pub fn relationships(&self) -> &RelationshipTable {
        self.relationships.as_ref()
    }

    /// Shared handle to the relationship table, for the reset task
    pub fn relationships_handle(&self) -> Arc<RelationshipTable> {
        Arc::clone(&self.relationships)
    }

    /// Get the random source used for partner selection
    pub fn rng(&self) -> &Mutex<StdRng> {
        self.rng.as_ref()
    }

    /// Get the pairing configuration
    pub fn config(&self) -> &WaifuConfig {
        self.config.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("directory", &self.directory)
            .field("rosters", &self.rosters.len())
            .field("relationships", &self.relationships.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    cache: Option<SharedCache>,
    config: Option<WaifuConfig>,
    seed: Option<u64>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(mut self, config: WaifuConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Seed the random source (deterministic selection, used in tests)
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the cache backend is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let cache = self
            .cache
            .ok_or_else(|| ServiceError::validation("cache is required"))?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(ServiceContext::new(
            cache,
            self.config.unwrap_or_default(),
            rng,
        ))
    }
}
