//! Authentication primitives for the SwitchBot API
//!
//! Every SwitchBot request carries four authentication headers derived from
//! the account token and secret. This crate holds the credentials, produces
//! the per-request timestamp and nonce, and computes the HMAC-SHA256
//! signature that binds them together.
//!
//! # Example
//!
//! ```no_run
//! use reqwest::header::HeaderMap;
//! use switchbot_auth::{attach_headers, Credentials};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = Credentials::from_env()?;
//!
//! let mut headers = HeaderMap::new();
//! let signed = attach_headers(&mut headers, &creds)?;
//! println!("t={} nonce={}", signed.timestamp, signed.nonce);
//! # Ok(())
//! # }
//! ```

mod credentials;
mod error;
pub mod nonce;
mod signer;

pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use nonce::{nonce, timestamp};
pub use signer::{
    attach_headers, sign, RequestSigner, SignedHeaders, CONTENT_TYPE_JSON, HEADER_AUTHORIZATION,
    HEADER_CONTENT_TYPE, HEADER_NONCE, HEADER_SIGN, HEADER_TIMESTAMP,
};
