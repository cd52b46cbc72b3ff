//! # waifu-service
//!
//! Application layer: roster resolution, candidate filtering, the pairing
//! engine, the relationship table with its daily reset, and the membership
//! listeners that keep the member directory warm.

pub mod dto;
pub mod services;

pub use dto::{Marriage, Requester};
pub use services::{
    Bindings, CandidateFilter, DailyReset, MembershipListener, PairOutcome, PairingEngine, PairingOptions,
    RelationshipTable, Roster, RosterResolver, RosterSource, RosterStore, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, WaifuService,
};
