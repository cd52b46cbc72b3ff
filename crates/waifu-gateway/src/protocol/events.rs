//! Event payloads pushed by the host

use serde::{Deserialize, Serialize};
use waifu_core::{GuildKey, MemberSnapshot, UserSnapshot};
use waifu_service::Requester;

/// Event type names this bot reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    MessageCreated,
    GuildMemberAdded,
    GuildMemberRemoved,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MessageCreated => "message-created",
            Self::GuildMemberAdded => "guild-member-added",
            Self::GuildMemberRemoved => "guild-member-removed",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "message-created" => Self::MessageCreated,
            "guild-member-added" => Self::GuildMemberAdded,
            "guild-member-removed" => Self::GuildMemberRemoved,
            _ => Self::Other(name),
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// A bot account logged in on the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub user: Option<UserSnapshot>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub self_id: Option<String>,
}

/// READY body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyBody {
    #[serde(default)]
    pub logins: Vec<Login>,
}

/// An event pushed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Sequence number (`id` in older hosts)
    #[serde(default, alias = "id")]
    pub sn: Option<u64>,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub self_id: String,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub guild: Option<Guild>,
    #[serde(default)]
    pub user: Option<UserSnapshot>,
    #[serde(default)]
    pub member: Option<MemberSnapshot>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Event {
    /// Create a bare event of the given type
    pub fn new(kind: EventType, platform: impl Into<String>, self_id: impl Into<String>) -> Self {
        Self {
            sn: None,
            kind,
            platform: platform.into(),
            self_id: self_id.into(),
            channel: None,
            guild: None,
            user: None,
            member: None,
            message: None,
        }
    }

    /// Group the event happened in
    pub fn guild_key(&self) -> Option<GuildKey> {
        self.guild
            .as_ref()
            .filter(|g| !g.id.is_empty())
            .map(|g| GuildKey::new(self.platform.clone(), g.id.clone()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel.as_ref().map(|c| c.id.as_str())
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn content(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.content.as_str())
    }

    /// The event's member payload, with the user filled in from the event
    /// when the host sent the member without one
    pub fn member_snapshot(&self) -> Option<MemberSnapshot> {
        let mut member = self.member.clone().unwrap_or_default();
        if member.user_id().is_none() {
            member.user = self.user.clone();
        }
        member.user_id().is_some().then_some(member)
    }

    /// The sender as a command requester
    pub fn requester(&self) -> Option<Requester> {
        let member = self.member_snapshot()?;
        let user_id = member.user_id()?.to_string();
        Some(Requester {
            platform: self.platform.clone(),
            guild_id: self.guild.as_ref().map(|g| g.id.clone()),
            user_id,
            self_id: self.self_id.clone(),
            member,
        })
    }
}
