//! Value objects - immutable types that represent domain concepts

mod keys;

pub use keys::{GuildKey, KeyParseError, MemberKey, SelfKey, UserKey};
