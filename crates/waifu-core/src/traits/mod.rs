//! Ports - interfaces the domain needs from the outside world

mod member_source;

pub use member_source::{MemberListSource, MemberPage};
