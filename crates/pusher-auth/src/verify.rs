//! Verification of signed query strings.
//!
//! The verifier is the mirror image of [`crate::signer`]: it
//!
//! 1. Parses and percent-decodes the query parameters
//! 2. Checks `auth_key`, `auth_version` and (when a body is given) `body_md5`
//! 3. Rebuilds the canonical query string without `auth_signature`
//! 4. Recomputes the signature over `METHOD\npath\ncanonical_query`
//! 5. Compares signatures using constant-time comparison
//!
//! Timestamp freshness is checked separately with [`check_timestamp`] so the
//! caller controls the clock and the tolerance.

use std::time::Duration;

use http::Method;
use pusher_core::Credentials;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{ParameterMap, build_canonical_query_string, decode_query_component};
use crate::digest::{compute_signature, hash_body};
use crate::error::AuthError;
use crate::signer::{AUTH_VERSION, SIGNATURE_PARAM, build_string_to_sign};

/// Parsed components of a signed query string.
#[derive(Debug, Clone)]
pub struct ParsedSignedQuery {
    /// The application key that signed the request.
    pub auth_key: String,
    /// Unix timestamp in seconds.
    pub auth_timestamp: i64,
    /// Protocol version.
    pub auth_version: String,
    /// Hex MD5 of the body, if the request had one.
    pub body_md5: Option<String>,
    /// The hex-encoded signature.
    pub signature: String,
    /// Every signed parameter (all but `auth_signature`), decoded.
    pub params: ParameterMap,
}

/// Parse a signed query string into its components.
///
/// # Errors
///
/// Returns [`AuthError::MissingQueryParam`] if a required parameter is absent
/// or [`AuthError::InvalidQuery`] if a parameter is repeated or malformed.
pub fn parse_signed_query(query: &str) -> Result<ParsedSignedQuery, AuthError> {
    let mut params = ParameterMap::new();
    let mut signature = None;

    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_query_component(raw_key);
        let value = decode_query_component(raw_value);

        if key == SIGNATURE_PARAM {
            if signature.replace(value).is_some() {
                return Err(AuthError::InvalidQuery(format!(
                    "duplicate parameter: {SIGNATURE_PARAM}"
                )));
            }
            continue;
        }

        if params.contains_key(&key) {
            return Err(AuthError::InvalidQuery(format!(
                "duplicate parameter: {key}"
            )));
        }
        params.insert(key, value);
    }

    let signature =
        signature.ok_or_else(|| AuthError::MissingQueryParam(SIGNATURE_PARAM.to_owned()))?;
    let auth_key = get_required_param(&params, "auth_key")?;
    let auth_version = get_required_param(&params, "auth_version")?;
    let timestamp_str = get_required_param(&params, "auth_timestamp")?;
    let auth_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        AuthError::InvalidQuery(format!("auth_timestamp is not an integer: {timestamp_str}"))
    })?;
    let body_md5 = params.get("body_md5").map(ToString::to_string);

    Ok(ParsedSignedQuery {
        auth_key,
        auth_timestamp,
        auth_version,
        body_md5,
        signature,
        params,
    })
}

/// Verify a signed request against the given credentials.
///
/// `query` is the query string as it appears in the URL, i.e. the
/// [`SignedQuery::to_url_query`](crate::SignedQuery::to_url_query) form.
/// Every component is percent-decoded, so the unescaped `Display` form only
/// verifies when no value contains `%`, `&` or `=`.
/// `body`, when given, must match the signed `body_md5`.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - Required query parameters are missing or malformed
/// - The request was signed with a different key or protocol version
/// - The body does not match `body_md5`
/// - The signature does not match
pub fn verify_signed_query(
    method: &Method,
    path: &str,
    query: &str,
    body: Option<&[u8]>,
    credentials: &Credentials,
) -> Result<ParsedSignedQuery, AuthError> {
    let parsed = parse_signed_query(query)?;

    debug!(
        auth_key = %parsed.auth_key,
        auth_timestamp = parsed.auth_timestamp,
        %method,
        path,
        "Verifying signed query"
    );

    if parsed.auth_key != credentials.key() {
        return Err(AuthError::AuthKeyMismatch(parsed.auth_key));
    }
    if parsed.auth_version != AUTH_VERSION {
        return Err(AuthError::UnsupportedVersion(parsed.auth_version));
    }

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        let provided = parsed
            .body_md5
            .as_deref()
            .ok_or_else(|| AuthError::MissingQueryParam("body_md5".to_owned()))?;
        if hash_body(body) != provided {
            return Err(AuthError::BodyDigestMismatch);
        }
    }

    let canonical_query = build_canonical_query_string(&parsed.params);
    let string_to_sign = build_string_to_sign(method, path, &canonical_query);
    let expected_signature =
        compute_signature(credentials.expose_secret(), string_to_sign.as_bytes());

    if parsed
        .signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        debug!(auth_key = %parsed.auth_key, "Signature verification succeeded");
        Ok(parsed)
    } else {
        debug!(string_to_sign, "Signature mismatch");
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Check that `auth_timestamp` is within `tolerance` of `now` (both Unix seconds).
///
/// # Errors
///
/// Returns [`AuthError::RequestExpired`] if the timestamp is too far in the
/// past or the future.
pub fn check_timestamp(
    auth_timestamp: i64,
    now: i64,
    tolerance: Duration,
) -> Result<(), AuthError> {
    if now.abs_diff(auth_timestamp) > tolerance.as_secs() {
        debug!(auth_timestamp, now, "Signed request outside accepted window");
        return Err(AuthError::RequestExpired);
    }
    Ok(())
}

fn get_required_param(params: &ParameterMap, name: &str) -> Result<String, AuthError> {
    params
        .get(name)
        .map(ToString::to_string)
        .ok_or_else(|| AuthError::MissingQueryParam(name.to_owned()))
}
