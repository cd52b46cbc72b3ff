//! Relationship table
//!
//! Process-wide map from a member's fid to their partner's snapshot. All
//! reads and writes go through [`Bindings`], a guard over the table lock, so
//! a check-then-write sequence is atomic. The guard must never be held across
//! an await point.

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};
use waifu_core::{GuildKey, MemberKey, MemberSnapshot};

/// Today's relationships across every group
#[derive(Debug, Default)]
pub struct RelationshipTable {
    entries: Mutex<HashMap<MemberKey, MemberSnapshot>>,
}

impl RelationshipTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the table for a read-check-write sequence
    pub fn lock(&self) -> Bindings<'_> {
        Bindings {
            entries: self.entries.lock(),
        }
    }

    /// Partner currently recorded for `fid`
    pub fn partner_of(&self, fid: &MemberKey) -> Option<MemberSnapshot> {
        self.lock().partner_of(fid).cloned()
    }

    /// Drop every entry of every group; returns how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Locked view of the relationship table
pub struct Bindings<'a> {
    entries: MutexGuard<'a, HashMap<MemberKey, MemberSnapshot>>,
}

impl Bindings<'_> {
    pub fn partner_of(&self, fid: &MemberKey) -> Option<&MemberSnapshot> {
        self.entries.get(fid)
    }

    /// Check if a member takes part in any relationship of the group,
    /// either as a requester or as someone's partner
    pub fn is_bound(&self, guild: &GuildKey, user_id: &str) -> bool {
        if self.entries.contains_key(&guild.member(user_id)) {
            return true;
        }
        self.entries
            .iter()
            .any(|(fid, partner)| fid.in_guild(guild) && partner.user_id() == Some(user_id))
    }

    /// Record `a -> b` and `b -> a`
    ///
    /// With `release_stale`, a previous partner of either side whose entry
    /// still points back at them is released first, so nobody stays bound
    /// to a member who has moved on.
    pub fn bind(
        &mut self,
        a: &MemberKey,
        a_snapshot: MemberSnapshot,
        b: &MemberKey,
        b_snapshot: MemberSnapshot,
        release_stale: bool,
    ) {
        if release_stale {
            self.release_previous(a, b);
            self.release_previous(b, a);
        }
        self.entries.insert(a.clone(), b_snapshot);
        self.entries.insert(b.clone(), a_snapshot);
    }

    /// Remove the reverse entry of `fid`'s current partner unless that
    /// partner is `keep`
    fn release_previous(&mut self, fid: &MemberKey, keep: &MemberKey) {
        let Some(previous) = self
            .entries
            .get(fid)
            .and_then(MemberSnapshot::user_id)
            .map(|uid| fid.guild().member(uid))
        else {
            return;
        };
        if &previous == keep {
            return;
        }

        let points_back = self
            .entries
            .get(&previous)
            .is_some_and(|p| p.user_id() == Some(fid.user_id.as_str()));
        if points_back {
            self.entries.remove(&previous);
            tracing::debug!(fid = %fid, released = %previous, "Released stale relationship");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
