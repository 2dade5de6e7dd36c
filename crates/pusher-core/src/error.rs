//! Error types for the Pusher core.

/// Core error type for configuration and credential handling.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required setting was not provided.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// The URL scheme is neither `http` nor `https`.
    #[error("unsupported scheme: {0} (expected http or https)")]
    InvalidScheme(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
