//! Domain entities - identity snapshots copied by value

mod member;
mod user;

pub use member::MemberSnapshot;
pub use user::UserSnapshot;
