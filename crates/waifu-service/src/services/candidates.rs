//! Candidate filtering
//!
//! Turns a resolved roster into the pool a requester may be paired with.
//! The roster itself is left untouched.

use std::collections::HashSet;

use waifu_core::{GuildKey, MemberSnapshot};

use super::context::ServiceContext;
use super::roster::Roster;
use crate::dto::Requester;

/// Candidate filter
pub struct CandidateFilter<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CandidateFilter<'a> {
    /// Create a new CandidateFilter
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Candidates for `requester` from `roster`, sorted by user id
    ///
    /// When the active-member filter is on but the markers cannot be read,
    /// the filter is skipped rather than emptying the pool.
    pub async fn candidates(
        &self,
        requester: &Requester,
        guild: &GuildKey,
        roster: &Roster,
    ) -> Vec<MemberSnapshot> {
        let active = if self.ctx.config().only_active_user {
            match self.ctx.directory().active_user_ids(guild).await {
                Ok(ids) => Some(ids),
                Err(e) => {
                    tracing::warn!(guild = %guild, error = %e, "Active markers unavailable");
                    None
                }
            }
        } else {
            None
        };

        self.apply(requester, roster, active.as_ref())
    }

    /// Apply the exclusion filters to a roster
    pub fn apply(
        &self,
        requester: &Requester,
        roster: &Roster,
        active: Option<&HashSet<String>>,
    ) -> Vec<MemberSnapshot> {
        let config = self.ctx.config();
        let bot = requester.self_key();
        let mut pool: Vec<MemberSnapshot> = roster
            .iter()
            .filter(|(user_id, _)| {
                user_id.as_str() != requester.user_id && user_id.as_str() != bot.self_id
            })
            .filter(|(user_id, _)| !config.is_excluded(&requester.platform, user_id))
            .filter(|(_, member)| !member.is_bot())
            .filter(|(user_id, _)| active.is_none_or(|ids| ids.contains(user_id.as_str())))
            .map(|(_, member)| member.clone())
            .collect();

        pool.sort_by(|a, b| a.user_id().cmp(&b.user_id()));
        pool
    }
}
