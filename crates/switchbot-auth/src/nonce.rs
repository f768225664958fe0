//! Per-request timestamp and nonce generation
//!
//! The nonce is a time-ordered 128-bit identifier laid out like a UUIDv7:
//! 48 bits of Unix milliseconds, a version nibble of `7`, the `10` variant
//! bits, and the remainder from the operating system CSPRNG. Generation is
//! stateless, so concurrent callers never contend on a shared counter.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Current wall-clock time in Unix milliseconds, base-10 encoded
pub fn timestamp() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Generate a fresh time-ordered nonce
///
/// Returns a 36 character lowercase `8-4-4-4-12` hex string.
///
/// # Errors
/// Returns [`AuthError::Entropy`] if the OS random source cannot be read.
/// There is no fallback to a weaker generator.
pub fn nonce() -> AuthResult<String> {
    let mut random = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| AuthError::Entropy(e.to_string()))?;

    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    Ok(layout(millis, random).hyphenated().to_string())
}

/// Stamp the timestamp, version and variant onto random bytes
fn layout(millis: u64, mut bytes: [u8; 16]) -> Uuid {
    bytes[..6].copy_from_slice(&millis.to_be_bytes()[2..]);
    bytes[6] = (bytes[6] & 0x0F) | 0x70;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    Uuid::from_bytes(bytes)
}
