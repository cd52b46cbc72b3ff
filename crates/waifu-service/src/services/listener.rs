//! Membership listeners
//!
//! Keep the member directory and the in-process rosters in step with what
//! the bot observes. Cache failures are logged and never reach the caller.

use std::time::Duration;

use tracing::instrument;
use waifu_core::{GuildKey, MemberSnapshot};

use super::context::ServiceContext;

/// Membership listener
pub struct MembershipListener<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipListener<'a> {
    /// Create a new MembershipListener
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// A member sent a message: refresh their snapshot and active marker
    #[instrument(skip_all, fields(guild = %guild, user_id = member.user_id().unwrap_or_default()))]
    pub async fn on_message(&self, guild: &GuildKey, member: &MemberSnapshot) {
        let Some(user_id) = member.user_id() else {
            return;
        };
        let directory = self.ctx.directory();

        if let Err(e) = directory.remember(guild, member).await {
            tracing::warn!(guild = %guild, user_id = %user_id, error = %e, "Failed to refresh member");
        }

        let window = Duration::from_secs(self.ctx.config().active_ttl_secs());
        if let Err(e) = directory.mark_active(guild, user_id, window).await {
            tracing::warn!(guild = %guild, user_id = %user_id, error = %e, "Failed to mark member active");
        }
    }

    /// A member joined the group
    ///
    /// Only groups with a resolved roster are updated.
    pub fn on_member_added(&self, guild: &GuildKey, member: MemberSnapshot) -> bool {
        let inserted = self.ctx.rosters().insert(guild, member);
        if inserted {
            tracing::debug!(guild = %guild, "Member added to roster");
        }
        inserted
    }

    /// A member left the group
    ///
    /// Their relationship, if any, survives until the daily reset.
    #[instrument(skip(self))]
    pub async fn on_member_removed(&self, guild: &GuildKey, user_id: &str) {
        self.ctx.rosters().remove(guild, user_id);
        if let Err(e) = self.ctx.directory().forget(guild, user_id).await {
            tracing::warn!(guild = %guild, user_id = %user_id, error = %e, "Failed to forget member");
        }
    }
}
