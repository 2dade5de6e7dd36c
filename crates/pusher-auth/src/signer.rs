//! Signed request construction.
//!
//! Every REST call is authenticated by query parameters:
//!
//! 1. `auth_key`, `auth_timestamp` (Unix seconds) and `auth_version=1.0` are set.
//! 2. If the request has a body, `body_md5` is set to its hex MD5 digest.
//! 3. Extra parameters are merged; reserved names are rejected.
//! 4. The merged map is rendered as a canonical query string.
//! 5. The string to sign is `METHOD\npath\ncanonical_query`.
//! 6. `auth_signature` is the hex HMAC-SHA256 of that string under the secret.
//!
//! The main entry point is [`RequestSigner::sign`].

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use http::Method;
use pusher_core::Credentials;
use tracing::debug;

use crate::canonical::{ParameterMap, canonical_pairs, encode_query_component, join_pairs};
use crate::digest::{ContentDigest, HmacSha256Authenticator, Md5Digest, MessageAuthenticator};
use crate::error::AuthError;

/// The only supported authentication protocol version.
pub const AUTH_VERSION: &str = "1.0";

/// Parameters set by the signer that callers may not supply.
pub const RESERVED_PARAMS: [&str; 4] = ["auth_key", "auth_timestamp", "auth_version", "body_md5"];

/// Name of the trailing signature parameter.
pub const SIGNATURE_PARAM: &str = "auth_signature";

/// Source of the current Unix timestamp in seconds.
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    Utc::now().timestamp()
}

/// A request to be signed.
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Full request path, e.g. `/apps/3/events`.
    pub path: &'a str,
    /// Serialized request body, if any.
    pub body: Option<&'a str>,
    /// Extra query parameters to sign.
    pub extra_params: Option<&'a ParameterMap>,
}

impl<'a> SigningRequest<'a> {
    /// A `GET` request without parameters.
    #[must_use]
    pub fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
            extra_params: None,
        }
    }

    /// A `POST` request carrying `body`.
    #[must_use]
    pub fn post(path: &'a str, body: &'a str) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
            extra_params: None,
        }
    }

    /// Attach extra query parameters.
    #[must_use]
    pub fn with_params(mut self, params: &'a ParameterMap) -> Self {
        self.extra_params = Some(params);
        self
    }
}

/// A signed query string.
///
/// `Display` yields the exact signed form
/// `name=value&...&auth_signature=<hex>`, with values unescaped.
/// [`SignedQuery::to_url_query`] yields the same pairs percent-encoded for
/// use in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    pairs: Vec<(String, String)>,
    query: String,
    signature: String,
}

impl SignedQuery {
    /// The canonical query string the signature was computed over.
    #[must_use]
    pub fn canonical_query(&self) -> &str {
        &self.query
    }

    /// The hex-encoded `auth_signature`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Look up a signed parameter value by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The query string as it should appear after `?` in a URL.
    #[must_use]
    pub fn to_url_query(&self) -> String {
        let mut encoded: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    encode_query_component(k),
                    encode_query_component(v)
                )
            })
            .collect();
        encoded.push(format!("{SIGNATURE_PARAM}={}", self.signature));
        encoded.join("&")
    }
}

impl fmt::Display for SignedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}&{SIGNATURE_PARAM}={}", self.query, self.signature)
    }
}

/// Signs REST requests with application credentials.
///
/// Signing is pure and synchronous; a signer can be shared across threads.
///
/// # Examples
///
/// ```
/// use pusher_auth::{RequestSigner, SigningRequest};
/// use pusher_core::Credentials;
///
/// let creds = Credentials::new("3", "278d425bdf160c739803", "7ad3773142a6692b25b8").unwrap();
/// let signer = RequestSigner::new(creds);
/// let body = r#"{"name":"foo","channels":["project-3"],"data":"{\"some\":\"data\"}"}"#;
///
/// let signed = signer
///     .sign_at(&SigningRequest::post("/apps/3/events", body), 1_353_088_179)
///     .unwrap();
/// assert_eq!(
///     signed.signature(),
///     "da454824c97ba181a32ccc17a72625ba02771f50b50e1e7430e47a1f3f457e6c"
/// );
/// ```
#[derive(Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    digest: Arc<dyn ContentDigest>,
    authenticator: Arc<dyn MessageAuthenticator>,
    clock: Clock,
}

impl RequestSigner {
    /// Create a signer using MD5 body digests, HMAC-SHA256 and the system clock.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            digest: Arc::new(Md5Digest),
            authenticator: Arc::new(HmacSha256Authenticator),
            clock: system_clock,
        }
    }

    /// Replace the body digest primitive.
    #[must_use]
    pub fn with_digest(mut self, digest: Arc<dyn ContentDigest>) -> Self {
        self.digest = digest;
        self
    }

    /// Replace the MAC primitive.
    #[must_use]
    pub fn with_authenticator(mut self, authenticator: Arc<dyn MessageAuthenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The credentials this signer signs with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign a request at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateParameter`] if an extra parameter uses a
    /// reserved name.
    pub fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedQuery, AuthError> {
        self.sign_at(request, (self.clock)())
    }

    /// Sign a request with an explicit `auth_timestamp`.
    ///
    /// For identical inputs and timestamp the output is byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateParameter`] if an extra parameter uses a
    /// reserved name.
    pub fn sign_at(
        &self,
        request: &SigningRequest<'_>,
        timestamp: i64,
    ) -> Result<SignedQuery, AuthError> {
        let mut params = ParameterMap::new();
        params.insert("auth_key", self.credentials.key());
        params.insert("auth_timestamp", timestamp);
        params.insert("auth_version", AUTH_VERSION);

        if let Some(body) = request.body {
            params.insert("body_md5", self.digest.digest(body.as_bytes()));
        }

        if let Some(extra) = request.extra_params {
            for (name, value) in extra.iter() {
                if is_reserved(name) {
                    return Err(AuthError::DuplicateParameter(name.to_owned()));
                }
                params.insert(name, value.clone());
            }
        }

        let pairs = canonical_pairs(&params);
        let query = join_pairs(&pairs);
        let string_to_sign = build_string_to_sign(&request.method, request.path, &query);

        debug!(string_to_sign, "Built string to sign");

        let signature = self
            .authenticator
            .mac(self.credentials.expose_secret(), string_to_sign.as_bytes());

        Ok(SignedQuery {
            pairs,
            query,
            signature,
        })
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Whether `name` is set by the signer itself.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name == SIGNATURE_PARAM || RESERVED_PARAMS.contains(&name)
}

/// Build the string to sign: `METHOD\npath\nquery`, method uppercased, no
/// trailing newline.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use pusher_auth::signer::build_string_to_sign;
///
/// assert_eq!(
///     build_string_to_sign(&Method::GET, "/apps/3/channels", "auth_key=k"),
///     "GET\n/apps/3/channels\nauth_key=k"
/// );
/// ```
#[must_use]
pub fn build_string_to_sign(method: &Method, path: &str, query: &str) -> String {
    format!("{}\n{path}\n{query}", method.as_str().to_ascii_uppercase())
}
