//! Member directory stored in the cache backend.
//!
//! Two namespaces per group:
//! - `members_<gid>`: user id -> JSON member snapshot, refreshed on every message
//! - `members_active_<gid>`: user id -> empty marker, expires after the active window

use std::collections::HashSet;
use std::time::Duration;

use waifu_core::{GuildKey, MemberSnapshot};

use crate::backend::{CacheResult, SharedCache};

/// Namespace prefix for member snapshots
pub const MEMBERS_PREFIX: &str = "members_";
/// Namespace prefix for active-member markers
pub const ACTIVE_PREFIX: &str = "members_active_";

/// Member snapshot TTL (2 days - refreshed by every observed message)
pub const MEMBER_TTL: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Passive member directory
#[derive(Clone)]
pub struct MemberDirectory {
    backend: SharedCache,
}

impl std::fmt::Debug for MemberDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDirectory").finish_non_exhaustive()
    }
}

impl MemberDirectory {
    /// Create a new member directory over a cache backend
    #[must_use]
    pub fn new(backend: SharedCache) -> Self {
        Self { backend }
    }

    /// Namespace holding member snapshots of a group
    fn members_ns(guild: &GuildKey) -> String {
        format!("{MEMBERS_PREFIX}{guild}")
    }

    /// Namespace holding active markers of a group
    fn active_ns(guild: &GuildKey) -> String {
        format!("{ACTIVE_PREFIX}{guild}")
    }

    /// Store or refresh a member snapshot
    ///
    /// Snapshots without a user id cannot be keyed and are ignored.
    pub async fn remember(&self, guild: &GuildKey, member: &MemberSnapshot) -> CacheResult<()> {
        let Some(user_id) = member.user_id() else {
            tracing::trace!(guild = %guild, "Skipping member snapshot without user id");
            return Ok(());
        };
        let value = serde_json::to_string(member)?;
        self.backend
            .set(&Self::members_ns(guild), user_id, &value, MEMBER_TTL)
            .await?;

        tracing::trace!(guild = %guild, user_id = %user_id, "Remembered member");
        Ok(())
    }

    /// Mark a member as active for `window`
    pub async fn mark_active(
        &self,
        guild: &GuildKey,
        user_id: &str,
        window: Duration,
    ) -> CacheResult<()> {
        self.backend
            .set(&Self::active_ns(guild), user_id, "", window)
            .await
    }

    /// Remove a member and their active marker
    pub async fn forget(&self, guild: &GuildKey, user_id: &str) -> CacheResult<()> {
        self.backend.delete(&Self::members_ns(guild), user_id).await?;
        self.backend.delete(&Self::active_ns(guild), user_id).await?;

        tracing::debug!(guild = %guild, user_id = %user_id, "Forgot member");
        Ok(())
    }

    /// Get a single member snapshot
    pub async fn member(
        &self,
        guild: &GuildKey,
        user_id: &str,
    ) -> CacheResult<Option<MemberSnapshot>> {
        match self.backend.get(&Self::members_ns(guild), user_id).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// All remembered members of a group
    ///
    /// Undecodable entries are skipped with a warning rather than failing the read.
    pub async fn members(&self, guild: &GuildKey) -> CacheResult<Vec<MemberSnapshot>> {
        let entries = self.backend.entries(&Self::members_ns(guild)).await?;

        let mut members = Vec::with_capacity(entries.len());
        for (key, raw) in entries {
            match serde_json::from_str::<MemberSnapshot>(&raw) {
                Ok(member) => members.push(member),
                Err(e) => {
                    tracing::warn!(guild = %guild, key = %key, error = %e, "Corrupt member entry");
                }
            }
        }
        Ok(members)
    }

    /// Ids of members active within their window
    pub async fn active_user_ids(&self, guild: &GuildKey) -> CacheResult<HashSet<String>> {
        Ok(self
            .backend
            .keys(&Self::active_ns(guild))
            .await?
            .into_iter()
            .collect())
    }
}
