//! Error types for calsync.

use thiserror::Error;

use crate::remote::store::RemoteError;

/// Errors that can occur in calsync operations.
///
/// Failures of individual remote operations are not errors at this level:
/// they are recorded per operation in the sync report.
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("Invalid target event: {0}")]
    InvalidTarget(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CalSyncError {
    fn from(e: serde_json::Error) -> Self {
        CalSyncError::Serialization(e.to_string())
    }
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
