//! Request DTOs

use waifu_core::{GuildKey, MemberKey, MemberSnapshot, SelfKey};

/// The member issuing a command, as seen in the triggering event
#[derive(Debug, Clone)]
pub struct Requester {
    pub platform: String,
    /// `None` for direct messages
    pub guild_id: Option<String>,
    pub user_id: String,
    /// The bot's own user id on this platform
    pub self_id: String,
    /// Normalized snapshot of the requester, used as the reverse relationship entry
    pub member: MemberSnapshot,
}

impl Requester {
    /// Group key (gid), if the command came from a group
    pub fn guild(&self) -> Option<GuildKey> {
        self.guild_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| GuildKey::new(self.platform.clone(), id.clone()))
    }

    /// Member key (fid), if the command came from a group
    pub fn member_key(&self) -> Option<MemberKey> {
        self.guild().map(|guild| guild.member(self.user_id.clone()))
    }

    /// The bot's own key (sid)
    pub fn self_key(&self) -> SelfKey {
        SelfKey::new(self.platform.clone(), self.self_id.clone())
    }
}
