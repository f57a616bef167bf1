//! Error types for connection acquisition.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for adspool operations.
pub type AdsPoolResult<T> = Result<T, AdsPoolError>;

/// Errors surfaced to callers of the connection facade.
///
/// None of these are retried internally. Use [`AdsPoolError::is_retryable`]
/// to decide whether a caller-side retry makes sense.
#[derive(Debug, Error)]
pub enum AdsPoolError {
    /// Required keys missing, or a mandant suffix had no base dictionary.
    #[error("invalid connection configuration: {0}")]
    Config(String),

    /// Neither default configuration location exists.
    #[error("default configuration not found at {} nor {}", .local.display(), .resource.display())]
    NotFound { local: PathBuf, resource: PathBuf },

    /// Default configuration exists but could not be read or parsed.
    #[error("malformed default configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The pool provider failed to build a pool for `key`.
    #[error("failed to create connection pool for {key}: {message}")]
    PoolCreation { key: String, message: String },

    /// No connection became available within `timeout`.
    #[error("timed out after {timeout:?} waiting for a connection from {key}: {message}")]
    CheckoutTimeout {
        key: String,
        timeout: Duration,
        message: String,
    },
}

/// Discriminant of [`AdsPoolError`], for matching without destructuring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    NotFound,
    Parse,
    PoolCreation,
    CheckoutTimeout,
}

impl AdsPoolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdsPoolError::Config(_) => ErrorKind::Config,
            AdsPoolError::NotFound { .. } => ErrorKind::NotFound,
            AdsPoolError::Parse { .. } => ErrorKind::Parse,
            AdsPoolError::PoolCreation { .. } => ErrorKind::PoolCreation,
            AdsPoolError::CheckoutTimeout { .. } => ErrorKind::CheckoutTimeout,
        }
    }

    /// Only capacity exhaustion is worth retrying; every other kind will fail
    /// again with the same inputs.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::CheckoutTimeout
    }
}
