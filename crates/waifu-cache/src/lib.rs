//! # waifu-cache
//!
//! Keyed cache with per-entry expiry, and the member directory built on it.
//!
//! ## Features
//!
//! - **Backends**: Redis (deadpool connection pool) or in-process memory
//! - **Member Directory**: member snapshots and active-member markers per group
//!
//! ## Example
//!
//! ```ignore
//! use waifu_cache::{MemberDirectory, MemoryCache};
//!
//! let directory = MemberDirectory::new(Arc::new(MemoryCache::new()));
//! directory.remember(&gid, &member).await?;
//! directory.mark_active(&gid, "42", Duration::from_secs(86_400)).await?;
//! let members = directory.members(&gid).await?;
//! ```

pub mod backend;
pub mod directory;
pub mod memory;
pub mod pool;

pub use backend::{CacheBackend, CacheError, CacheResult, SharedCache};
pub use directory::{MemberDirectory, ACTIVE_PREFIX, MEMBERS_PREFIX, MEMBER_TTL};
pub use memory::MemoryCache;
pub use pool::{RedisPool, RedisPoolConfig};
