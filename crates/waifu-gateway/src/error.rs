//! Gateway error types

use waifu_common::AppError;
use waifu_core::HostError;

/// Errors talking to the Satori host
#[derive(Debug, thiserror::Error)]
pub enum SatoriError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Host returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    Closed,
}

impl SatoriError {
    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Check if reconnecting may help
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::WebSocket(_) | Self::Closed => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Json(_) | Self::Protocol(_) => false,
        }
    }
}

impl From<SatoriError> for HostError {
    fn from(err: SatoriError) -> Self {
        match err {
            SatoriError::Status { status, body } => HostError::Status { status, body },
            SatoriError::Json(e) => HostError::Decode(e.to_string()),
            other => HostError::Request(other.to_string()),
        }
    }
}

impl From<SatoriError> for AppError {
    fn from(err: SatoriError) -> Self {
        AppError::Gateway(err.to_string())
    }
}

/// Result type for Satori operations
pub type SatoriResult<T> = Result<T, SatoriError>;
