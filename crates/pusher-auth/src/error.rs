//! Error types for request signing and verification.
//!
//! All signing and verification failures are represented by [`AuthError`].
//! Signing-stage errors are raised synchronously before any network activity.

/// Errors that can occur while signing or verifying Pusher requests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// An extra parameter collides with a reserved authentication parameter.
    #[error("{0} is a reserved parameter and cannot be overridden")]
    DuplicateParameter(String),

    /// A payload could not be serialized to JSON.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required authentication query parameter is missing.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// The query string could not be parsed.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The `auth_key` in the query does not belong to the verifying credentials.
    #[error("Unknown auth key: {0}")]
    AuthKeyMismatch(String),

    /// The `auth_version` is not supported (only `1.0` is).
    #[error("Unsupported auth version: {0}")]
    UnsupportedVersion(String),

    /// The `body_md5` parameter does not match the request body.
    #[error("Body digest does not match")]
    BodyDigestMismatch,

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,

    /// The `auth_timestamp` is outside the accepted window.
    #[error("Request has expired")]
    RequestExpired,
}
