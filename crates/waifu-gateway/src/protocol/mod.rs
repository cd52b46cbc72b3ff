//! Satori wire protocol
//!
//! Signals exchanged over the event WebSocket and the event payloads they
//! carry.

mod events;
mod opcodes;
mod signal;

pub use events::{Channel, Event, EventType, Guild, Login, Message, ReadyBody};
pub use opcodes::OpCode;
pub use signal::{IdentifyBody, Signal};
