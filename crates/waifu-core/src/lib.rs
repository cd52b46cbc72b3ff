//! # waifu-core
//!
//! Domain layer containing member snapshots, fully-qualified identifiers,
//! pairing errors, and the port used to reach the messaging host.
//! This crate has zero dependencies on infrastructure (cache, HTTP, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{MemberSnapshot, UserSnapshot};
pub use error::{DomainError, HostError, PairingError};
pub use traits::{MemberListSource, MemberPage};
pub use value_objects::{GuildKey, KeyParseError, MemberKey, SelfKey, UserKey};
