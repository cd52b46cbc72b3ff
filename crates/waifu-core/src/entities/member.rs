//! Member snapshot - a user's presence in one group

use serde::{Deserialize, Serialize};

use super::user::UserSnapshot;

/// Group member snapshot (user identity plus group-scoped overrides)
///
/// The messaging host may omit `user` on partial payloads; such members
/// cannot be addressed and are skipped by roster building.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl MemberSnapshot {
    /// Create a member snapshot wrapping a user
    pub fn new(user: UserSnapshot) -> Self {
        Self {
            user: Some(user),
            nick: None,
            avatar: None,
        }
    }

    /// Set the group nickname
    #[must_use]
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// Platform-scoped user id, if the payload carried one
    pub fn user_id(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Check if the member is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.user.as_ref().is_some_and(UserSnapshot::is_bot)
    }

    /// Get display name: group nick, user nick, user name, then user id
    pub fn display_name(&self) -> &str {
        let user = self.user.as_ref();
        self.nick
            .as_deref()
            .or_else(|| user.and_then(|u| u.nick.as_deref()))
            .or_else(|| user.and_then(|u| u.name.as_deref()))
            .or_else(|| self.user_id())
            .unwrap_or_default()
    }

    /// Get avatar reference: group avatar first, then user avatar
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.avatar.as_deref()))
    }
}

impl From<UserSnapshot> for MemberSnapshot {
    fn from(user: UserSnapshot) -> Self {
        Self::new(user)
    }
}
