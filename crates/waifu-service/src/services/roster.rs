//! Roster resolution
//!
//! Builds a best-effort member map for a group from an ordered list of
//! sources, stopping at the first one that yields members:
//!
//! 1. the in-process roster
//! 2. the live member list on the messaging host (all pages)
//! 3. the member directory in the cache
//! 4. whatever pages the live fetch got before it failed
//!
//! Host and cache failures are logged and treated as "no data"; resolution
//! itself never fails.

use std::collections::{HashMap, HashSet};
use std::fmt;

use dashmap::DashMap;
use tracing::instrument;
use waifu_core::{GuildKey, HostError, MemberListSource, MemberSnapshot};

use super::context::ServiceContext;

/// Resolved members of one group, by user id
pub type Roster = HashMap<String, MemberSnapshot>;

/// Where a resolved roster came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSource {
    InProcess,
    Live,
    Directory,
    /// Pages fetched before the live listing failed
    PartialLive,
}

impl RosterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProcess => "in_process",
            Self::Live => "live",
            Self::Directory => "directory",
            Self::PartialLive => "partial_live",
        }
    }
}

impl fmt::Display for RosterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-process rosters, per group
///
/// Entries never expire; they change only through membership events.
#[derive(Debug, Default)]
pub struct RosterStore {
    rosters: DashMap<GuildKey, Roster>,
}

impl RosterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a group's roster, if resolved and non-empty
    pub fn get(&self, guild: &GuildKey) -> Option<Roster> {
        self.rosters
            .get(guild)
            .filter(|roster| !roster.is_empty())
            .map(|roster| roster.value().clone())
    }

    /// Store a resolved roster; empty rosters are not kept
    pub fn store(&self, guild: &GuildKey, roster: Roster) {
        if roster.is_empty() {
            return;
        }
        self.rosters.insert(guild.clone(), roster);
    }

    /// Add a member to an already resolved roster
    ///
    /// Returns `false` when the group has no roster yet or the member has no
    /// user id.
    pub fn insert(&self, guild: &GuildKey, member: MemberSnapshot) -> bool {
        let Some(user_id) = member.user_id().map(str::to_string) else {
            return false;
        };
        match self.rosters.get_mut(guild) {
            Some(mut roster) => {
                roster.insert(user_id, member);
                true
            }
            None => false,
        }
    }

    /// Remove a member; returns whether they were present
    pub fn remove(&self, guild: &GuildKey, user_id: &str) -> bool {
        self.rosters
            .get_mut(guild)
            .is_some_and(|mut roster| roster.remove(user_id).is_some())
    }

    /// Number of groups with a resolved roster
    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }
}

/// Result of walking the host's paginated member list
#[derive(Debug, Default)]
struct LiveFetch {
    members: Roster,
    error: Option<HostError>,
}

/// Roster resolver
pub struct RosterResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RosterResolver<'a> {
    /// Create a new RosterResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a group's roster
    pub async fn resolve(&self, guild: &GuildKey, host: &dyn MemberListSource) -> Roster {
        self.resolve_with_source(guild, host)
            .await
            .map(|(roster, _)| roster)
            .unwrap_or_default()
    }

    /// Resolve a group's roster, reporting which source produced it
    ///
    /// Returns `None` when every source came back empty.
    #[instrument(skip_all, fields(guild = %guild))]
    pub async fn resolve_with_source(
        &self,
        guild: &GuildKey,
        host: &dyn MemberListSource,
    ) -> Option<(Roster, RosterSource)> {
        if let Some(roster) = self.ctx.rosters().get(guild) {
            return Some((roster, RosterSource::InProcess));
        }

        let live = fetch_live(host, guild).await;
        let resolved = match live.error {
            None if !live.members.is_empty() => Some((live.members, RosterSource::Live)),
            error => {
                if let Some(e) = error {
                    tracing::warn!(
                        guild = %guild,
                        fetched = live.members.len(),
                        error = %e,
                        "Live member list failed, falling back to directory"
                    );
                }
                let directory = self.read_directory(guild).await;
                if !directory.is_empty() {
                    Some((directory, RosterSource::Directory))
                } else if !live.members.is_empty() {
                    Some((live.members, RosterSource::PartialLive))
                } else {
                    None
                }
            }
        };

        match resolved {
            Some((roster, source)) => {
                tracing::debug!(
                    guild = %guild,
                    source = %source,
                    members = roster.len(),
                    "Roster resolved"
                );
                self.ctx.rosters().store(guild, roster.clone());
                Some((roster, source))
            }
            None => {
                tracing::info!(guild = %guild, "No roster source returned members");
                None
            }
        }
    }

    async fn read_directory(&self, guild: &GuildKey) -> Roster {
        match self.ctx.directory().members(guild).await {
            Ok(members) => into_roster(members),
            Err(e) => {
                tracing::warn!(guild = %guild, error = %e, "Member directory read failed");
                Roster::new()
            }
        }
    }
}

/// Follow the continuation token until the listing is exhausted
async fn fetch_live(host: &dyn MemberListSource, guild: &GuildKey) -> LiveFetch {
    let mut fetch = LiveFetch::default();
    let mut seen_tokens = HashSet::new();
    let mut next: Option<String> = None;

    loop {
        let page = match host.guild_member_list(&guild.guild_id, next.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                fetch.error = Some(e);
                return fetch;
            }
        };

        let has_next = page.has_next();
        fetch.members.extend(into_roster(page.data));

        if !has_next {
            return fetch;
        }
        let token = page.next.unwrap_or_default();
        if !seen_tokens.insert(token.clone()) {
            tracing::warn!(guild = %guild, token = %token, "Host repeated a page token");
            return fetch;
        }
        next = Some(token);
    }
}

fn into_roster(members: impl IntoIterator<Item = MemberSnapshot>) -> Roster {
    members
        .into_iter()
        .filter_map(|member| {
            let user_id = member.user_id()?.to_string();
            Some((user_id, member))
        })
        .collect()
}
