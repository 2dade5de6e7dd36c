//! Digest primitives used for signing.
//!
//! Two independent capabilities are injected into the signers so tests can
//! substitute deterministic fakes:
//!
//! - [`ContentDigest`] proves body integrity (`body_md5`). It is not keyed and
//!   plays no part in authentication.
//! - [`MessageAuthenticator`] computes the keyed MAC over the exact signing
//!   string, for both request signatures and channel tokens.

use hmac::{Hmac, KeyInit, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Non-keyed content digest, hex encoded.
pub trait ContentDigest: Send + Sync {
    /// Digest the body bytes and return a lowercase hex string.
    fn digest(&self, body: &[u8]) -> String;
}

/// Keyed message authentication code, hex encoded.
pub trait MessageAuthenticator: Send + Sync {
    /// Compute the MAC of `message` under `secret` and return a lowercase hex string.
    ///
    /// The message is used byte-for-byte: no re-encoding, no trimming.
    fn mac(&self, secret: &[u8], message: &[u8]) -> String;
}

/// MD5 body digest, as required by the `body_md5` parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Digest;

impl ContentDigest for Md5Digest {
    fn digest(&self, body: &[u8]) -> String {
        hash_body(body)
    }
}

/// HMAC-SHA256 authenticator used for `auth_signature` and channel tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct HmacSha256Authenticator;

impl MessageAuthenticator for HmacSha256Authenticator {
    fn mac(&self, secret: &[u8], message: &[u8]) -> String {
        compute_signature(secret, message)
    }
}

/// Compute the MD5 digest of a request body and return it as a hex string.
///
/// # Examples
///
/// ```
/// use pusher_auth::digest::hash_body;
///
/// assert_eq!(hash_body(b""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
#[must_use]
pub fn hash_body(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// Compute HMAC-SHA256 of `data` using `secret` and return it hex encoded.
#[must_use]
pub fn compute_signature(secret: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can accept keys of any length");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}
