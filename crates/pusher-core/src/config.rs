//! Client configuration.
//!
//! Endpoint settings are explicit per-client values with defaults applied at
//! construction time. Configuration can be deserialized (camelCase keys, with
//! the deprecated `appKey` accepted for `key`) or loaded from environment
//! variables.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::credentials::Credentials;
use crate::error::{CoreError, CoreResult};

/// Default REST API host.
pub const DEFAULT_HOST: &str = "api.pusherapp.com";

/// URL scheme used to reach the REST API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP (default port 80).
    #[default]
    Http,
    /// HTTP over TLS (default port 443).
    Https,
}

impl Scheme {
    /// The scheme as it appears in a URL.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// The port implied by the scheme when none is given.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(CoreError::InvalidScheme(s.to_owned()))
        }
    }
}

/// Configuration for a Pusher client.
///
/// # Examples
///
/// ```
/// use pusher_core::PusherConfig;
///
/// let config: PusherConfig = serde_json::from_str(
///     r#"{"appId": "3", "appKey": "278d425bdf160c739803", "secret": "7ad3773142a6692b25b8"}"#,
/// ).unwrap();
/// assert_eq!(config.key, "278d425bdf160c739803");
/// assert_eq!(config.base_url(), "http://api.pusherapp.com");
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PusherConfig {
    /// Application id.
    pub app_id: String,
    /// Public application key. `appKey` is accepted as a deprecated alias.
    #[serde(alias = "appKey")]
    pub key: String,
    /// Shared secret. Never serialized or logged.
    pub secret: String,
    /// REST API host.
    pub host: String,
    /// URL scheme.
    pub scheme: Scheme,
    /// Explicit port; `None` means the scheme's default port.
    pub port: Option<u16>,
    /// Log level used by binaries when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            key: String::new(),
            secret: String::new(),
            host: DEFAULT_HOST.to_owned(),
            scheme: Scheme::default(),
            port: None,
            log_level: "info".to_owned(),
        }
    }
}

impl PusherConfig {
    /// Create a configuration with default endpoint settings.
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            key: key.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PUSHER_APP_ID` | *(required)* |
    /// | `PUSHER_KEY` (legacy: `PUSHER_APP_KEY`) | *(required)* |
    /// | `PUSHER_SECRET` | *(required)* |
    /// | `PUSHER_HOST` | `api.pusherapp.com` |
    /// | `PUSHER_SCHEME` | `http` |
    /// | `PUSHER_PORT` | scheme default |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// This is what [`PusherConfig::from_env`] uses with the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("PUSHER_APP_ID") {
            config.app_id = v;
        }
        if let Some(v) = lookup("PUSHER_KEY") {
            config.key = v;
        } else if let Some(v) = lookup("PUSHER_APP_KEY") {
            warn!("PUSHER_APP_KEY is deprecated, use PUSHER_KEY instead");
            config.key = v;
        }
        if let Some(v) = lookup("PUSHER_SECRET") {
            config.secret = v;
        }
        if let Some(v) = lookup("PUSHER_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("PUSHER_SCHEME") {
            config.scheme = v.parse()?;
        }
        if let Some(v) = lookup("PUSHER_PORT") {
            let port = v
                .parse::<u16>()
                .map_err(|_| CoreError::Config(format!("invalid PUSHER_PORT: {v}")))?;
            config.port = Some(port);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used to sign requests.
    pub fn validate(&self) -> CoreResult<()> {
        self.credentials()?;
        if self.host.is_empty() {
            return Err(CoreError::MissingSetting("host"));
        }
        Ok(())
    }

    /// Build the signing credentials from this configuration.
    pub fn credentials(&self) -> CoreResult<Credentials> {
        Credentials::new(&self.app_id, &self.key, &self.secret)
    }

    /// The port requests are sent to.
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// `scheme://host[:port]`, with the port omitted when it is the scheme default.
    #[must_use]
    pub fn base_url(&self) -> String {
        let port = self.effective_port();
        if port == self.scheme.default_port() {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{port}", self.scheme, self.host)
        }
    }
}

impl fmt::Debug for PusherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PusherConfig")
            .field("app_id", &self.app_id)
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = PusherConfig::default();
        assert_eq!(config.host, "api.pusherapp.com");
        assert_eq!(config.scheme, Scheme::Http);
        assert_eq!(config.effective_port(), 80);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_normalize_legacy_app_key_alias() {
        let config: PusherConfig =
            serde_json::from_str(r#"{"appId": "1", "appKey": "legacy", "secret": "s"}"#).unwrap();
        assert_eq!(config.key, "legacy");
        assert_eq!(config.credentials().unwrap().key(), "legacy");
    }

    #[test]
    fn test_should_deserialize_endpoint_settings() {
        let config: PusherConfig = serde_json::from_str(
            r#"{
                "appId": "1", "key": "k", "secret": "s",
                "host": "api-eu.pusher.com", "scheme": "https", "port": 8443
            }"#,
        )
        .unwrap();
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.base_url(), "https://api-eu.pusher.com:8443");
    }

    #[test]
    fn test_should_omit_default_port_from_base_url() {
        let mut config = PusherConfig::new("1", "k", "s");
        assert_eq!(config.base_url(), "http://api.pusherapp.com");

        config.port = Some(8080);
        assert_eq!(config.base_url(), "http://api.pusherapp.com:8080");

        config.scheme = Scheme::Https;
        config.port = None;
        assert_eq!(config.base_url(), "https://api.pusherapp.com");
    }

    #[test]
    fn test_should_load_config_from_lookup() {
        let config = PusherConfig::from_lookup(lookup_from(&[
            ("PUSHER_APP_ID", "3"),
            ("PUSHER_KEY", "key"),
            ("PUSHER_SECRET", "secret"),
            ("PUSHER_SCHEME", "HTTPS"),
            ("PUSHER_PORT", "4430"),
        ]))
        .unwrap();
        assert_eq!(config.app_id, "3");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.port, Some(4430));
    }

    #[test]
    fn test_should_fall_back_to_legacy_app_key_variable() {
        let config = PusherConfig::from_lookup(lookup_from(&[
            ("PUSHER_APP_ID", "3"),
            ("PUSHER_APP_KEY", "old-key"),
            ("PUSHER_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.key, "old-key");
    }

    #[test]
    fn test_should_reject_missing_secret() {
        let result =
            PusherConfig::from_lookup(lookup_from(&[("PUSHER_APP_ID", "3"), ("PUSHER_KEY", "k")]));
        assert!(matches!(result, Err(CoreError::MissingSetting("secret"))));
    }

    #[test]
    fn test_should_reject_invalid_scheme_and_port() {
        let base = [
            ("PUSHER_APP_ID", "3"),
            ("PUSHER_KEY", "k"),
            ("PUSHER_SECRET", "s"),
        ];

        let mut vars = base.to_vec();
        vars.push(("PUSHER_SCHEME", "ftp"));
        assert!(matches!(
            PusherConfig::from_lookup(lookup_from(&vars)),
            Err(CoreError::InvalidScheme(_))
        ));

        let mut vars = base.to_vec();
        vars.push(("PUSHER_PORT", "not-a-port"));
        assert!(matches!(
            PusherConfig::from_lookup(lookup_from(&vars)),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_should_redact_secret_in_debug() {
        let config = PusherConfig::new("1", "k", "very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
