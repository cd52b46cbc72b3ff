//! Data transfer objects passed between the gateway and the services

mod requests;
mod responses;

pub use requests::Requester;
pub use responses::Marriage;
