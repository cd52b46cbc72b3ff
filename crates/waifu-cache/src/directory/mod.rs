//! Member directory module.
//!
//! Passive record of group members and recent activity.

mod member_directory;

pub use member_directory::{MemberDirectory, ACTIVE_PREFIX, MEMBERS_PREFIX, MEMBER_TTL};
