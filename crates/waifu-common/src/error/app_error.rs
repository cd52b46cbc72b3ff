//! Application error types
//!
//! Unified error handling for startup and the event loop.

use std::fmt;
use waifu_core::{DomainError, HostError};

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Directory cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Messaging host errors
    #[error(transparent)]
    Host(#[from] HostError),

    // Gateway connection errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Host(_) => "HOST_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the process cannot continue after this error
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Internal(_))
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::config(err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
