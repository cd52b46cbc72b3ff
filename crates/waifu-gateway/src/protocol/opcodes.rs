//! Satori signal operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Signal operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Event pushed by the host (host only)
    Event = 0,
    /// Keep-alive (bot only)
    Ping = 1,
    /// Keep-alive answer (host only)
    Pong = 2,
    /// Authenticate the connection (bot only)
    Identify = 3,
    /// Authentication accepted (host only)
    Ready = 4,
    /// Host metadata changed (host only)
    Meta = 5,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Event),
            1 => Some(Self::Ping),
            2 => Some(Self::Pong),
            3 => Some(Self::Identify),
            4 => Some(Self::Ready),
            5 => Some(Self::Meta),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if the bot sends this op code
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(self, Self::Ping | Self::Identify)
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Ping => "Ping",
            Self::Pong => "Pong",
            Self::Identify => "Identify",
            Self::Ready => "Ready",
            Self::Meta => "Meta",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
