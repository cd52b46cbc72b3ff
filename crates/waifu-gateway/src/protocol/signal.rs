//! Signal envelope
//!
//! Every WebSocket frame is `{"op": <code>, "body": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::{Event, ReadyBody};
use super::OpCode;

/// One frame on the event WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub op: OpCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// IDENTIFY body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Last event sequence seen, to replay missed events after a reconnect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sn: Option<u64>,
}

impl Signal {
    // === Bot Signals ===

    /// Create an Identify signal (op=3)
    #[must_use]
    pub fn identify(token: Option<String>, sn: Option<u64>) -> Self {
        Self {
            op: OpCode::Identify,
            body: serde_json::to_value(IdentifyBody { token, sn }).ok(),
        }
    }

    /// Create a Ping signal (op=1)
    #[must_use]
    pub fn ping() -> Self {
        Self {
            op: OpCode::Ping,
            body: None,
        }
    }

    // === Parsing Host Signals ===

    /// Try to parse as an Event payload (op=0)
    pub fn as_event(&self) -> Option<Event> {
        if self.op != OpCode::Event {
            return None;
        }
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_value(b.clone()).ok())
    }

    /// Try to parse as a Ready payload (op=4)
    pub fn as_ready(&self) -> Option<ReadyBody> {
        if self.op != OpCode::Ready {
            return None;
        }
        Some(
            self.body
                .as_ref()
                .and_then(|b| serde_json::from_value(b.clone()).ok())
                .unwrap_or_default(),
        )
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
