//! Satori HTTP API client

mod satori_client;

pub use satori_client::{SatoriBot, SatoriClient};
