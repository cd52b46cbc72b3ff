//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::fmt;

use waifu_cache::CacheError;
use waifu_common::AppError;
use waifu_core::{DomainError, PairingError};

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain outcome (pairing rejections, host and cache failures)
    Domain(DomainError),

    /// Command is switched off in configuration
    Disabled(&'static str),

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::Disabled(command) => write!(f, "Command disabled: {command}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The pairing rejection carried by this error, if any
    pub fn pairing(&self) -> Option<&PairingError> {
        match self {
            Self::Domain(DomainError::Pairing(e)) => Some(e),
            _ => None,
        }
    }

    /// Check if the requester should see this error as a reply
    pub fn is_user_visible(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_user_visible(),
            _ => false,
        }
    }

    /// Get the error code for replies and logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Disabled(_) => "COMMAND_DISABLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<PairingError> for ServiceError {
    fn from(err: PairingError) -> Self {
        Self::Domain(DomainError::Pairing(err))
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        Self::Domain(DomainError::CacheError(err.to_string()))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Disabled(command) => {
                AppError::internal(anyhow::anyhow!("command disabled: {command}"))
            }
            ServiceError::Validation(msg) => AppError::Config(msg),
            ServiceError::Internal(msg) => AppError::internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
