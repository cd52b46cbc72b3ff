//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Recoverable pairing outcomes that are reported back to the requester
///
/// None of these mutate the relationship table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("Too few members to pair with")]
    MembersTooFew,

    #[error("Command must be used inside a group")]
    NotInGuild,

    #[error("No target specified")]
    NoTarget,

    #[error("Cannot target yourself")]
    TargetSelf,

    #[error("Target is not a member of this group: {0}")]
    TargetNotFound(String),

    #[error("Target already has a partner: {name}")]
    TargetTaken { name: String },
}

impl PairingError {
    /// Get an error code string for replies and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::MembersTooFew => "MEMBERS_TOO_FEW",
            Self::NotInGuild => "NOT_IN_GUILD",
            Self::NoTarget => "NO_TARGET",
            Self::TargetSelf => "TARGET_SELF",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::TargetTaken { .. } => "TARGET_TAKEN",
        }
    }
}

/// Failures reported by the messaging host
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host request failed: {0}")]
    Request(String),

    #[error("Host returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected host response: {0}")]
    Decode(String),
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pairing(e) => e.code(),
            Self::Host(_) => "HOST_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be reported to the requester as a reply
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Pairing(_))
    }
}
