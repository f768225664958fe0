//! SwitchBot account credentials
//!
//! The token identifies the account and is sent verbatim on every request.
//! The secret is the HMAC key and never leaves the process.
//!
//! # Security
//!
//! The secret is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Keeps the value out of `Debug` output
//! - Requires explicit access via `expose_secret()`

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretBox};

use crate::error::{AuthError, AuthResult};

/// Environment variable holding the account token
pub const TOKEN_ENV_VAR: &str = "SWITCHBOT_TOKEN";
/// Environment variable holding the signing secret
pub const SECRET_ENV_VAR: &str = "SWITCHBOT_SECRET";

/// API credentials for signed requests
///
/// Immutable once built. The secret is zeroized when the value is dropped.
pub struct Credentials {
    /// Account token (sent as `Authorization`)
    token: String,
    /// Signing secret (zeroized on drop)
    secret: SecretBox<Vec<u8>>,
}

impl Credentials {
    /// Create new credentials from a token and secret
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] if either value is empty or
    /// the token cannot be sent as a header value.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        let token = token.into();
        let secret = secret.into();

        if token.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "token and secret must not be empty".to_string(),
            ));
        }

        HeaderValue::from_str(&token).map_err(|e| {
            AuthError::InvalidCredentials(format!("token is not a valid header value: {}", e))
        })?;

        Ok(Self {
            token,
            secret: SecretBox::new(Box::new(secret.into_bytes())),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `SWITCHBOT_TOKEN` and `SWITCHBOT_SECRET` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .map_err(|_| AuthError::EnvVarNotSet(TOKEN_ENV_VAR.to_string()))?;
        let secret = std::env::var(SECRET_ENV_VAR)
            .map_err(|_| AuthError::EnvVarNotSet(SECRET_ENV_VAR.to_string()))?;

        Self::new(token, secret)
    }

    /// Get the account token
    pub fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            secret: SecretBox::new(Box::new(self.secret.expose_secret().clone())),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible = self
            .token
            .char_indices()
            .nth(8)
            .map_or(self.token.as_str(), |(idx, _)| &self.token[..idx]);

        f.debug_struct("Credentials")
            .field("token", &format!("{}...", visible))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
