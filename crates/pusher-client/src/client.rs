//! The Pusher REST API facade.

use std::fmt;
use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use pusher_auth::signer::Clock;
use pusher_auth::{
    ChannelAuthResponse, ChannelAuthorizer, ParameterMap, RequestSigner, SignedQuery,
    SigningRequest,
};
use pusher_core::PusherConfig;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::event::{Channels, TriggerEvent, encode_event_data};
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

/// Path of the event publishing endpoint, relative to the app.
pub const EVENTS_PATH: &str = "/events";

/// Client for the Pusher REST API.
///
/// Every operation signs its request, sends it through the [`Transport`]
/// exactly once, and resolves to one `Result`. The client holds no mutable
/// state and can be shared behind an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use pusher_client::Pusher;
/// use pusher_core::PusherConfig;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), pusher_client::ClientError> {
/// let config = PusherConfig::new("3", "278d425bdf160c739803", "7ad3773142a6692b25b8");
/// let pusher = Pusher::new(config)?;
/// pusher.trigger("my-channel", "my-event", &json!({"message": "hello"}), None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pusher {
    config: PusherConfig,
    base_url: String,
    signer: RequestSigner,
    authorizer: ChannelAuthorizer,
    transport: Arc<dyn Transport>,
}

impl Pusher {
    /// Create a client that sends requests with [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is incomplete, or
    /// [`ClientError::Request`] if the HTTP client cannot be built.
    pub fn new(config: PusherConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::with_default_timeout()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client with an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is incomplete.
    pub fn with_transport(
        config: PusherConfig,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let credentials = config.credentials()?;

        Ok(Self {
            base_url: config.base_url(),
            signer: RequestSigner::new(credentials.clone()),
            authorizer: ChannelAuthorizer::new(credentials),
            config,
            transport,
        })
    }

    /// Replace the timestamp source used for `auth_timestamp`.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.signer = self.signer.with_clock(clock);
        self
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &PusherConfig {
        &self.config
    }

    /// The public application key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.signer.credentials().key()
    }

    /// Issue a channel authorization token for a subscribing client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the channel data cannot be serialized.
    pub fn authorize_channel(
        &self,
        socket_id: &str,
        channel: &str,
        channel_data: Option<&Value>,
    ) -> ClientResult<ChannelAuthResponse> {
        Ok(self.authorizer.authorize(socket_id, channel, channel_data)?)
    }

    /// The channel token issuer, for callers that need `verify` or typed data.
    #[must_use]
    pub fn authorizer(&self) -> &ChannelAuthorizer {
        &self.authorizer
    }

    /// Publish an event to one or more channels.
    ///
    /// String messages are sent verbatim; anything else is serialized to JSON.
    /// `socket_id` excludes that connection from delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if the message cannot be
    /// serialized, [`ClientError::Transport`] on a non-success status, or
    /// [`ClientError::Request`] if no response was received.
    pub async fn trigger<M: Serialize + ?Sized>(
        &self,
        channels: impl Into<Channels>,
        event: &str,
        message: &M,
        socket_id: Option<&str>,
    ) -> ClientResult<TransportResponse> {
        let channels = channels.into();
        let body = TriggerEvent {
            name: event,
            data: encode_event_data(message)?,
            channels: &channels,
            socket_id,
        };

        debug!(event, channels = channels.len(), "Triggering event");

        self.post(EVENTS_PATH, &body).await
    }

    /// Publish an event to a single named channel.
    ///
    /// # Errors
    ///
    /// See [`Pusher::trigger`].
    pub async fn trigger_on_channel<M: Serialize + ?Sized>(
        &self,
        channel: &str,
        event: &str,
        message: &M,
    ) -> ClientResult<TransportResponse> {
        self.trigger(channel, event, message, None).await
    }

    /// Send a signed `POST` with a JSON body to `path` (relative to the app).
    ///
    /// # Errors
    ///
    /// See [`Pusher::trigger`].
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<TransportResponse> {
        let api_path = self.api_path(path);
        let body = serde_json::to_string(body)?;
        let signed = self.signer.sign(&SigningRequest::post(&api_path, &body))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        self.dispatch(TransportRequest {
            method: Method::POST,
            url: self.build_url(&api_path, &signed),
            headers,
            body: Some(body),
        })
        .await
    }

    /// Send a signed `GET` to `path` (relative to the app) with optional
    /// query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if a parameter uses a reserved name, and
    /// otherwise the errors of [`Pusher::trigger`].
    pub async fn get(
        &self,
        path: &str,
        params: Option<&ParameterMap>,
    ) -> ClientResult<TransportResponse> {
        let api_path = self.api_path(path);
        let mut request = SigningRequest::get(&api_path);
        if let Some(params) = params {
            request = request.with_params(params);
        }
        let signed = self.signer.sign(&request)?;

        self.dispatch(TransportRequest {
            method: Method::GET,
            url: self.build_url(&api_path, &signed),
            headers: HeaderMap::new(),
            body: None,
        })
        .await
    }

    /// `/apps/{app_id}{path}`.
    fn api_path(&self, path: &str) -> String {
        format!("/apps/{}{path}", self.config.app_id)
    }

    fn build_url(&self, api_path: &str, signed: &SignedQuery) -> String {
        format!("{}{api_path}?{}", self.base_url, signed.to_url_query())
    }

    async fn dispatch(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let method = request.method.clone();
        let response = self.transport.send(request).await?;

        if response.is_success() {
            debug!(%method, status = %response.status, "Request succeeded");
            Ok(response)
        } else {
            warn!(
                %method,
                status = %response.status,
                body = %response.body,
                "Pusher request failed"
            );
            Err(ClientError::Transport {
                status: response.status,
                body: response.body,
            })
        }
    }
}

impl fmt::Debug for Pusher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pusher")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
