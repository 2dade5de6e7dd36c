//! Error types for the Pusher client.

use http::StatusCode;
use pusher_auth::AuthError;
use pusher_core::CoreError;

/// Errors returned by [`crate::Pusher`] operations.
///
/// Every facade call resolves to exactly one success or one of these errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Signing failed (for example a reserved parameter was supplied).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// A message or request body could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote service answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Transport {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The transport could not complete the request at all.
    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl ClientError {
    /// The HTTP status of a [`ClientError::Transport`] error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

/// Convenience result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
