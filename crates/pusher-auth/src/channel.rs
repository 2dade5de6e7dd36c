//! Channel authorization tokens.
//!
//! A client subscribing to a private or presence channel asks the host
//! application for a token. The token signs:
//!
//! ```text
//! socket_id:channel_name[:channel_data]
//! ```
//!
//! and is returned as `{"auth": "<key>:<hex-hmac>", "channel_data"?: "<json>"}`.
//! `channel_data` is present only when channel data was supplied; it is the
//! serialized string, byte-identical to the one that was signed.

use std::fmt;
use std::sync::Arc;

use pusher_core::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::digest::{HmacSha256Authenticator, MessageAuthenticator};
use crate::error::AuthError;

/// The token returned to a subscribing client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAuthResponse {
    /// `<key>:<hex signature>`.
    pub auth: String,
    /// The serialized channel data that was signed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
}

/// Issues channel authorization tokens.
///
/// # Examples
///
/// ```
/// use pusher_auth::ChannelAuthorizer;
/// use pusher_core::Credentials;
/// use serde_json::json;
///
/// let creds = Credentials::new("3", "278d425bdf160c739803", "7ad3773142a6692b25b8").unwrap();
/// let authorizer = ChannelAuthorizer::new(creds);
///
/// let token = authorizer
///     .authorize("1234.1234", "presence-room", Some(&json!({"user_id": 10})))
///     .unwrap();
/// assert_eq!(token.channel_data.as_deref(), Some(r#"{"user_id":10}"#));
/// ```
#[derive(Clone)]
pub struct ChannelAuthorizer {
    credentials: Credentials,
    authenticator: Arc<dyn MessageAuthenticator>,
}

impl ChannelAuthorizer {
    /// Create an authorizer using HMAC-SHA256.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            authenticator: Arc::new(HmacSha256Authenticator),
        }
    }

    /// Replace the MAC primitive.
    #[must_use]
    pub fn with_authenticator(mut self, authenticator: Arc<dyn MessageAuthenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Sign a subscription for `socket_id` on `channel`.
    ///
    /// `None` and JSON `null` both mean "no channel data"; any other value,
    /// including an empty object, is serialized and signed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Serialization`] if the channel data cannot be
    /// serialized.
    pub fn authorize(
        &self,
        socket_id: &str,
        channel: &str,
        channel_data: Option<&Value>,
    ) -> Result<ChannelAuthResponse, AuthError> {
        let channel_data = match channel_data {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::to_string(value)?),
        };

        let string_to_sign =
            build_channel_string_to_sign(socket_id, channel, channel_data.as_deref());

        debug!(socket_id, channel, "Signing channel subscription");

        let signature = self
            .authenticator
            .mac(self.credentials.expose_secret(), string_to_sign.as_bytes());

        Ok(ChannelAuthResponse {
            auth: format!("{}:{signature}", self.credentials.key()),
            channel_data,
        })
    }

    /// Sign a presence subscription with arbitrary serializable member data.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Serialization`] if `channel_data` cannot be
    /// represented as JSON.
    pub fn authorize_with<T: Serialize + ?Sized>(
        &self,
        socket_id: &str,
        channel: &str,
        channel_data: &T,
    ) -> Result<ChannelAuthResponse, AuthError> {
        let value = serde_json::to_value(channel_data)?;
        self.authorize(socket_id, channel, Some(&value))
    }

    /// Check an `auth` token produced for the given subscription.
    ///
    /// `channel_data` must be the exact string returned alongside the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidQuery`] if the token is malformed,
    /// [`AuthError::AuthKeyMismatch`] if it was issued for another key, or
    /// [`AuthError::SignatureDoesNotMatch`] if the signature is wrong.
    pub fn verify(
        &self,
        socket_id: &str,
        channel: &str,
        channel_data: Option<&str>,
        auth: &str,
    ) -> Result<(), AuthError> {
        let (key, provided) = auth
            .split_once(':')
            .ok_or_else(|| AuthError::InvalidQuery(format!("malformed auth token: {auth}")))?;

        if key != self.credentials.key() {
            return Err(AuthError::AuthKeyMismatch(key.to_owned()));
        }

        let string_to_sign = build_channel_string_to_sign(socket_id, channel, channel_data);
        let expected = self
            .authenticator
            .mac(self.credentials.expose_secret(), string_to_sign.as_bytes());

        if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
            Ok(())
        } else {
            debug!(socket_id, channel, "Channel token signature mismatch");
            Err(AuthError::SignatureDoesNotMatch)
        }
    }
}

impl fmt::Debug for ChannelAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelAuthorizer")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Build `socket_id:channel[:channel_data]`.
///
/// # Examples
///
/// ```
/// use pusher_auth::channel::build_channel_string_to_sign;
///
/// assert_eq!(build_channel_string_to_sign("1.2", "private-a", None), "1.2:private-a");
/// assert_eq!(
///     build_channel_string_to_sign("1.2", "presence-a", Some("{}")),
///     "1.2:presence-a:{}"
/// );
/// ```
#[must_use]
pub fn build_channel_string_to_sign(
    socket_id: &str,
    channel: &str,
    channel_data: Option<&str>,
) -> String {
    match channel_data {
        Some(data) => format!("{socket_id}:{channel}:{data}"),
        None => format!("{socket_id}:{channel}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const TEST_KEY: &str = "278d425bdf160c739803";
    const TEST_SECRET: &str = "7ad3773142a6692b25b8";

    fn test_authorizer() -> ChannelAuthorizer {
        ChannelAuthorizer::new(Credentials::new("3", TEST_KEY, TEST_SECRET).unwrap())
    }

    #[test]
    fn test_should_sign_private_channel_matching_reference_example() {
        let token = test_authorizer()
            .authorize("1234.1234", "private-foobar", None)
            .unwrap();
        assert_eq!(
            token.auth,
            "278d425bdf160c739803:58df8b0c36d6982b82c3ecf6b4662e34fe8c25bba48f5369f135bf843651c3a4"
        );
        assert!(token.channel_data.is_none());
    }

    #[test]
    fn test_should_sign_presence_channel_with_channel_data() {
        let data = json!({"user_id": 10, "user_info": {"name": "Mr. Channel"}});
        let token = test_authorizer()
            .authorize("1234.1234", "presence-foobar", Some(&data))
            .unwrap();

        assert_eq!(
            token.channel_data.as_deref(),
            Some(r#"{"user_id":10,"user_info":{"name":"Mr. Channel"}}"#)
        );
        assert_eq!(
            token.auth,
            "278d425bdf160c739803:fc92c2263fd5b72721e20dd1a06a900e6b3c4fbfac6cb9b098d68eb7911498a2"
        );
    }

    #[test]
    fn test_should_omit_channel_data_field_when_absent() {
        let token = test_authorizer().authorize("s1", "c1", None).unwrap();
        let json = serde_json::to_value(&token).unwrap();

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("auth"));
        assert!(!object.contains_key("channel_data"));
    }

    #[test]
    fn test_should_include_serialized_channel_data_when_supplied() {
        let token = test_authorizer()
            .authorize("s1", "c1", Some(&json!({"foo": 1})))
            .unwrap();
        assert_eq!(token.channel_data.as_deref(), Some(r#"{"foo":1}"#));

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["channel_data"], r#"{"foo":1}"#);
    }

    #[test]
    fn test_should_distinguish_empty_object_from_absence() {
        let authorizer = test_authorizer();
        let empty = authorizer.authorize("s1", "c1", Some(&json!({}))).unwrap();
        let absent = authorizer.authorize("s1", "c1", None).unwrap();

        assert_eq!(empty.channel_data.as_deref(), Some("{}"));
        assert_ne!(empty.auth, absent.auth);
    }

    #[test]
    fn test_should_treat_null_as_absent() {
        let authorizer = test_authorizer();
        let null = authorizer.authorize("s1", "c1", Some(&Value::Null)).unwrap();
        let absent = authorizer.authorize("s1", "c1", None).unwrap();
        assert_eq!(null, absent);
    }

    #[test]
    fn test_should_authorize_with_serializable_struct() {
        #[derive(Serialize)]
        struct Member<'a> {
            user_id: u32,
            user_info: Info<'a>,
        }

        #[derive(Serialize)]
        struct Info<'a> {
            name: &'a str,
        }

        let member = Member {
            user_id: 10,
            user_info: Info {
                name: "Mr. Channel",
            },
        };
        let via_struct = test_authorizer()
            .authorize_with("1234.1234", "presence-foobar", &member)
            .unwrap();
        let via_value = test_authorizer()
            .authorize(
                "1234.1234",
                "presence-foobar",
                Some(&json!({"user_id": 10, "user_info": {"name": "Mr. Channel"}})),
            )
            .unwrap();
        assert_eq!(via_struct, via_value);
    }

    #[test]
    fn test_should_verify_issued_token() {
        let authorizer = test_authorizer();
        let token = authorizer
            .authorize("s1", "presence-c1", Some(&json!({"user_id": "u"})))
            .unwrap();

        assert!(
            authorizer
                .verify("s1", "presence-c1", token.channel_data.as_deref(), &token.auth)
                .is_ok()
        );
        assert!(matches!(
            authorizer.verify("s2", "presence-c1", token.channel_data.as_deref(), &token.auth),
            Err(AuthError::SignatureDoesNotMatch)
        ));
        assert!(matches!(
            authorizer.verify("s1", "presence-c1", None, &token.auth),
            Err(AuthError::SignatureDoesNotMatch)
        ));
    }

    #[test]
    fn test_should_reject_token_for_other_key_or_malformed() {
        let authorizer = test_authorizer();
        assert!(matches!(
            authorizer.verify("s1", "c1", None, "other:abc"),
            Err(AuthError::AuthKeyMismatch(_))
        ));
        assert!(matches!(
            authorizer.verify("s1", "c1", None, "no-separator"),
            Err(AuthError::InvalidQuery(_))
        ));
    }
}
