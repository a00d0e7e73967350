//! Mapping of Calendar API failures onto per-operation remote errors.

use std::fmt::Display;

use calsync_core::remote::store::RemoteError;
use serde::Deserialize;

/// Google's error body: `{"error": {"code": 409, "message": "..."}}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Error for a non-success response, keeping Google's message when it sent one.
pub fn api_error(status: u16, body: &str) -> RemoteError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(body) => body.error.message,
        Err(_) => body.trim().to_string(),
    };

    if message.is_empty() {
        RemoteError::new(Some(status), format!("HTTP {status}"))
    } else {
        RemoteError::new(Some(status), message)
    }
}

/// Error for a request that never got a usable response.
pub fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::new(err.status().map(|s| s.as_u16()), err.to_string())
}

/// Error raised locally, with no HTTP status.
pub fn remote_error(err: impl Display) -> RemoteError {
    RemoteError::new(None, err.to_string())
}

/// Google answers 410 for events that are already deleted.
pub fn is_gone(err: &RemoteError) -> bool {
    err.code == Some(410)
}
