//! Integration test utilities for the pairing bot
//!
//! This crate provides fake Satori hosts (member list, HTTP API and event
//! WebSocket) and a small bot harness for end-to-end scenarios.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
