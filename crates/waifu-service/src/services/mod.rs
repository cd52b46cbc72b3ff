//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and implements one
//! slice of the pairing workflow.

pub mod candidates;
pub mod context;
pub mod error;
pub mod listener;
pub mod pairing;
pub mod relationship;
pub mod reset;
pub mod roster;
pub mod waifu;

// Re-export all services for convenience
pub use candidates::CandidateFilter;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use listener::MembershipListener;
pub use pairing::{PairOutcome, PairingEngine, PairingOptions};
pub use relationship::{Bindings, RelationshipTable};
pub use reset::DailyReset;
pub use roster::{Roster, RosterResolver, RosterSource, RosterStore};
pub use waifu::WaifuService;
