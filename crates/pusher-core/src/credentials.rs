//! Application credentials used as signing material.
//!
//! [`Credentials`] holds the public key, the shared secret, and the
//! application id. The secret is only ever handed to a MAC function; it is
//! redacted from `Debug` output and the type does not implement `Serialize`.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Immutable application credentials.
///
/// # Examples
///
/// ```
/// use pusher_core::Credentials;
///
/// let creds = Credentials::new("3", "278d425bdf160c739803", "7ad3773142a6692b25b8").unwrap();
/// assert_eq!(creds.key(), "278d425bdf160c739803");
/// assert!(!format!("{creds:?}").contains("7ad3773142a6692b25b8"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    key: String,
    secret: String,
}

impl Credentials {
    /// Create credentials from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingSetting`] if any of the values is empty.
    pub fn new(
        app_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> CoreResult<Self> {
        let app_id = app_id.into();
        let key = key.into();
        let secret = secret.into();

        if app_id.is_empty() {
            return Err(CoreError::MissingSetting("appId"));
        }
        if key.is_empty() {
            return Err(CoreError::MissingSetting("key"));
        }
        if secret.is_empty() {
            return Err(CoreError::MissingSetting("secret"));
        }

        Ok(Self {
            app_id,
            key,
            secret,
        })
    }

    /// The application id, used in every REST path (`/apps/{app_id}/...`).
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The public application key (safe to log).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Expose the secret for MAC computation.
    ///
    /// Never log or display the return value.
    #[must_use]
    pub fn expose_secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
