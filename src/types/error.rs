//! Error types for the gateway

use hyper::StatusCode;

use crate::chain::ChainError;
use crate::registry::RegistryError;
use crate::storage::StoreError;
use crate::waitlist::WaitlistError;

/// Main error type for gateway startup and serving
#[derive(Debug, thiserror::Error)]
pub enum AvasaraError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Chain client error: {0}")]
    Chain(#[from] ChainError),

    #[error("Content store error: {0}")]
    Store(#[from] StoreError),

    #[error("Waitlist error: {0}")]
    Waitlist(#[from] WaitlistError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AvasaraError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Registry(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Chain(_) | Self::Store(_) | Self::Waitlist(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<std::io::Error> for AvasaraError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<hyper::Error> for AvasaraError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, AvasaraError>;
