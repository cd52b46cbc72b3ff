//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use waifu_core::{GuildKey, MemberKey, MemberSnapshot, UserSnapshot};
use waifu_service::Requester;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub const PLATFORM: &str = "qq";
pub const GUILD: &str = "g1";
pub const BOT_ID: &str = "bot";

/// A human member named after its id
pub fn member(id: &str) -> MemberSnapshot {
    MemberSnapshot::new(
        UserSnapshot::new(id)
            .with_name(format!("name-{id}"))
            .with_avatar(format!("https://cdn.example/{id}.png")),
    )
}

/// A bot account
pub fn bot_member(id: &str) -> MemberSnapshot {
    MemberSnapshot::new(UserSnapshot::new(id).with_name(format!("bot-{id}")).bot())
}

/// Members for each id
pub fn members(ids: &[&str]) -> Vec<MemberSnapshot> {
    ids.iter().map(|id| member(id)).collect()
}

pub fn guild() -> GuildKey {
    GuildKey::new(PLATFORM, GUILD)
}

pub fn fid(user_id: &str) -> MemberKey {
    guild().member(user_id)
}

/// A requester speaking in the test group
pub fn requester(user_id: &str) -> Requester {
    Requester {
        platform: PLATFORM.to_string(),
        guild_id: Some(GUILD.to_string()),
        user_id: user_id.to_string(),
        self_id: BOT_ID.to_string(),
        member: member(user_id),
    }
}

/// A unique group id, for tests that share a cache backend
pub fn unique_guild() -> GuildKey {
    GuildKey::new(PLATFORM, format!("it-{}-{}", std::process::id(), unique_suffix()))
}
