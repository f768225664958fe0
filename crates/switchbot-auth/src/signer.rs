//! HMAC-SHA256 request signing
//!
//! SwitchBot signature algorithm:
//! 1. message = token + t + nonce
//! 2. HMAC-SHA256(secret, message)
//! 3. Base64 (standard, padded) encode the digest
//!
//! The four authentication headers plus `Content-Type` are written onto the
//! outgoing request. `t` and `nonce` are generated fresh for every request,
//! so a signature must never be reused.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;
use tracing::trace;

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::nonce::{nonce, timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the account token
pub const HEADER_AUTHORIZATION: &str = "Authorization";
/// Header carrying the millisecond timestamp
pub const HEADER_TIMESTAMP: &str = "t";
/// Header carrying the per-request nonce
pub const HEADER_NONCE: &str = "nonce";
/// Header carrying the signature
pub const HEADER_SIGN: &str = "sign";
/// Content type header name
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Content type sent with every request
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Sign `token + timestamp + nonce` with the credentials' secret
///
/// Deterministic for a given (token, secret, timestamp, nonce).
pub fn sign(credentials: &Credentials, timestamp: &str, nonce: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(credentials.secret_bytes())
        .expect("HMAC can take key of any size");
    mac.update(credentials.token().as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(nonce.as_bytes());

    BASE64.encode(mac.finalize().into_bytes())
}

/// Generate fresh authentication values and write them onto `headers`
///
/// Sets exactly `Authorization`, `t`, `nonce`, `sign` and `Content-Type`.
/// Call once per request, immediately before it is sent.
pub fn attach_headers(
    headers: &mut HeaderMap,
    credentials: &Credentials,
) -> AuthResult<SignedHeaders> {
    let signer = RequestSigner::new(credentials)?;
    signer.apply(headers)?;
    trace!(t = %signer.timestamp, nonce = %signer.nonce, "Signed request headers");
    Ok(signer.into_signed())
}

/// Authentication values produced for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Millisecond timestamp sent as `t`
    pub timestamp: String,
    /// Nonce sent as `nonce`
    pub nonce: String,
    /// Signature sent as `sign`
    pub sign: String,
}

/// Request signer bound to one timestamp/nonce pair
#[derive(Debug)]
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
    timestamp: String,
    nonce: String,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer with a fresh timestamp and nonce
    pub fn new(credentials: &'a Credentials) -> AuthResult<Self> {
        let nonce = nonce()?;
        Ok(Self {
            credentials,
            timestamp: timestamp(),
            nonce,
        })
    }

    /// Create a signer with caller-supplied values
    pub fn with_parts(
        credentials: &'a Credentials,
        timestamp: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            timestamp: timestamp.into(),
            nonce: nonce.into(),
        }
    }

    /// Timestamp for this request
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Nonce for this request
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Compute the signature
    pub fn sign(&self) -> String {
        sign(self.credentials, &self.timestamp, &self.nonce)
    }

    /// Write the five request headers
    pub fn apply(&self, headers: &mut HeaderMap) -> AuthResult<()> {
        let mut authorization = header_value(HEADER_AUTHORIZATION, self.credentials.token())?;
        authorization.set_sensitive(true);
        let mut signature = header_value(HEADER_SIGN, &self.sign())?;
        signature.set_sensitive(true);

        headers.insert(HeaderName::from_static("authorization"), authorization);
        headers.insert(
            HeaderName::from_static(HEADER_TIMESTAMP),
            header_value(HEADER_TIMESTAMP, &self.timestamp)?,
        );
        headers.insert(
            HeaderName::from_static(HEADER_NONCE),
            header_value(HEADER_NONCE, &self.nonce)?,
        );
        headers.insert(HeaderName::from_static(HEADER_SIGN), signature);
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static(CONTENT_TYPE_JSON),
        );
        Ok(())
    }

    fn into_signed(self) -> SignedHeaders {
        let sign = self.sign();
        SignedHeaders {
            timestamp: self.timestamp,
            nonce: self.nonce,
            sign,
        }
    }
}

fn header_value(name: &'static str, value: &str) -> AuthResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| AuthError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}
