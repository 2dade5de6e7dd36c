//! Request signing and channel authorization for the Pusher REST API.
//!
//! This crate implements the client side of Pusher's authentication scheme:
//! every REST call carries `auth_key`, `auth_timestamp`, `auth_version`, an
//! optional `body_md5`, and an `auth_signature` computed as HMAC-SHA256 over
//! `METHOD\npath\ncanonical_query`. The sibling channel authorization token
//! signs `socket_id:channel[:channel_data]` for private and presence channels.
//!
//! # Usage
//!
//! ```rust
//! use pusher_auth::{ChannelAuthorizer, RequestSigner, SigningRequest};
//! use pusher_core::Credentials;
//!
//! let creds = Credentials::new("3", "278d425bdf160c739803", "7ad3773142a6692b25b8").unwrap();
//!
//! let signer = RequestSigner::new(creds.clone());
//! let signed = signer
//!     .sign_at(&SigningRequest::get("/apps/3/channels"), 1_353_088_179)
//!     .unwrap();
//! assert!(signed.to_string().contains("&auth_signature="));
//!
//! let authorizer = ChannelAuthorizer::new(creds);
//! let token = authorizer.authorize("1234.1234", "private-foobar", None).unwrap();
//! assert!(token.auth.starts_with("278d425bdf160c739803:"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Parameter map and canonical query string construction
//! - [`channel`] - Channel authorization tokens
//! - [`digest`] - Content digest and message authenticator primitives
//! - [`error`] - Authentication error types
//! - [`signer`] - Signed request builder
//! - [`verify`] - Signed query string verification

pub mod canonical;
pub mod channel;
pub mod digest;
pub mod error;
pub mod signer;
pub mod verify;

pub use canonical::{ParamValue, ParameterMap, build_canonical_query_string};
pub use channel::{ChannelAuthResponse, ChannelAuthorizer};
pub use digest::{ContentDigest, HmacSha256Authenticator, Md5Digest, MessageAuthenticator};
pub use error::AuthError;
pub use signer::{RESERVED_PARAMS, RequestSigner, SignedQuery, SigningRequest};
pub use verify::{ParsedSignedQuery, check_timestamp, verify_signed_query};
