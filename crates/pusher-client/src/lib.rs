//! Pusher REST API client.
//!
//! [`Pusher`] publishes events, sends signed `GET`/`POST` requests to
//! app-scoped endpoints, and issues channel authorization tokens. Requests
//! are signed with [`pusher_auth::RequestSigner`] and sent through a
//! pluggable [`Transport`]; [`ReqwestTransport`] is used by default.
//!
//! # Modules
//!
//! - [`client`] - The [`Pusher`] facade
//! - [`error`] - Client error types
//! - [`event`] - Trigger payloads and message encoding
//! - [`transport`] - HTTP transport capability and its `reqwest` implementation

pub mod client;
pub mod error;
pub mod event;
pub mod transport;

pub use client::{EVENTS_PATH, Pusher};
pub use error::{ClientError, ClientResult};
pub use event::{Channels, TriggerEvent};
pub use pusher_auth::{ChannelAuthResponse, ParamValue, ParameterMap};
pub use transport::{
    DEFAULT_TIMEOUT, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};
