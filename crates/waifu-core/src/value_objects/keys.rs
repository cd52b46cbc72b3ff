//! Fully-qualified identifiers
//!
//! Platform ids are only unique within a platform, so every key carries the
//! platform name. Rendered forms use `:` as separator:
//! - gid: `platform:guild`
//! - fid: `platform:guild:user`
//! - sid: `platform:self`
//! - uid: `platform:user`

use std::fmt;
use std::str::FromStr;

/// Error when parsing a key from its rendered form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("expected {expected} segments in '{input}'")]
    SegmentCount { expected: usize, input: String },

    #[error("empty segment in '{0}'")]
    EmptySegment(String),
}

fn split_exact(input: &str, expected: usize) -> Result<Vec<&str>, KeyParseError> {
    let parts: Vec<&str> = input.splitn(expected, ':').collect();
    if parts.len() != expected {
        return Err(KeyParseError::SegmentCount {
            expected,
            input: input.to_string(),
        });
    }
    if parts.iter().any(|p| p.is_empty()) {
        return Err(KeyParseError::EmptySegment(input.to_string()));
    }
    Ok(parts)
}

/// Group key (gid): platform + group identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuildKey {
    pub platform: String,
    pub guild_id: String,
}

impl GuildKey {
    pub fn new(platform: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            guild_id: guild_id.into(),
        }
    }

    /// Member key for a user inside this group
    pub fn member(&self, user_id: impl Into<String>) -> MemberKey {
        MemberKey {
            platform: self.platform.clone(),
            guild_id: self.guild_id.clone(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for GuildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.guild_id)
    }
}

impl FromStr for GuildKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_exact(s, 2)?;
        Ok(Self::new(parts[0], parts[1]))
    }
}

/// Member key (fid): platform + group identifier + user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub platform: String,
    pub guild_id: String,
    pub user_id: String,
}

impl MemberKey {
    pub fn new(
        platform: impl Into<String>,
        guild_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            guild_id: guild_id.into(),
            user_id: user_id.into(),
        }
    }

    /// The group this member belongs to
    pub fn guild(&self) -> GuildKey {
        GuildKey::new(self.platform.clone(), self.guild_id.clone())
    }

    /// Check if this member belongs to the given group
    #[inline]
    pub fn in_guild(&self, guild: &GuildKey) -> bool {
        self.platform == guild.platform && self.guild_id == guild.guild_id
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.platform, self.guild_id, self.user_id)
    }
}

impl FromStr for MemberKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_exact(s, 3)?;
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

/// Self key (sid): platform + the bot's own user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelfKey {
    pub platform: String,
    pub self_id: String,
}

impl SelfKey {
    pub fn new(platform: impl Into<String>, self_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            self_id: self_id.into(),
        }
    }
}

impl fmt::Display for SelfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.self_id)
    }
}

/// User key (uid): platform + user identifier, used for exclusion lists
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserKey {
    pub platform: String,
    pub user_id: String,
}

impl UserKey {
    pub fn new(platform: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            user_id: user_id.into(),
        }
    }

    /// Check if this key names the given user on the given platform
    #[inline]
    pub fn matches(&self, platform: &str, user_id: &str) -> bool {
        self.platform == platform && self.user_id == user_id
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.user_id)
    }
}

impl FromStr for UserKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_exact(s, 2)?;
        Ok(Self::new(parts[0], parts[1]))
    }
}
