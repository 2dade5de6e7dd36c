//! Event payloads for the `/events` endpoint.

use serde::Serialize;
use serde_json::Value;

/// One or more channel names an event is published to.
///
/// A single channel is normalized into a one-element list so single- and
/// multi-channel triggers produce the same request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Channels(Vec<String>);

impl Channels {
    /// The channel names.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no channel was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Channels {
    fn from(channel: &str) -> Self {
        Self(vec![channel.to_owned()])
    }
}

impl From<String> for Channels {
    fn from(channel: String) -> Self {
        Self(vec![channel])
    }
}

impl From<Vec<String>> for Channels {
    fn from(channels: Vec<String>) -> Self {
        Self(channels)
    }
}

impl From<Vec<&str>> for Channels {
    fn from(channels: Vec<&str>) -> Self {
        Self(channels.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl From<&[&str]> for Channels {
    fn from(channels: &[&str]) -> Self {
        Self(channels.iter().map(|c| (*c).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Channels {
    fn from(channels: [&str; N]) -> Self {
        Self(channels.iter().map(|c| (*c).to_owned()).collect())
    }
}

/// JSON body of a trigger request.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerEvent<'a> {
    /// Event name.
    pub name: &'a str,
    /// Event payload, always a string on the wire.
    pub data: String,
    /// Target channels.
    pub channels: &'a Channels,
    /// Socket to exclude from delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<&'a str>,
}

/// Encode an event message for the `data` field.
///
/// Strings are sent verbatim; every other value is serialized to JSON.
///
/// # Examples
///
/// ```
/// use pusher_client::event::encode_event_data;
/// use serde_json::json;
///
/// assert_eq!(encode_event_data("hello").unwrap(), "hello");
/// assert_eq!(encode_event_data(&json!({"a": 1})).unwrap(), r#"{"a":1}"#);
/// ```
pub fn encode_event_data<M: Serialize + ?Sized>(message: &M) -> Result<String, serde_json::Error> {
    match serde_json::to_value(message)? {
        Value::String(s) => Ok(s),
        _ => serde_json::to_string(message),
    }
}
