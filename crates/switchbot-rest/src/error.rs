//! Error types for REST API operations

use std::fmt;

use switchbot_auth::AuthError;

use crate::codec::CodecError;
use crate::status::StatusCode;
use crate::transport::TransportError;

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Client configuration was rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credentials were missing, malformed, or could not be signed
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The request path could not be resolved against the base URL
    #[error("Invalid path {path:?}: {source}")]
    InvalidPath {
        /// Path as given by the caller
        path: String,
        /// URL parser error
        #[source]
        source: url::ParseError,
    },

    /// The request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] CodecError),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The network call failed, timed out, or was cancelled
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A non-error HTTP response did not contain a valid envelope
    #[error("Unexpected response (HTTP {status}): {source}, body: {body}")]
    Protocol {
        /// HTTP status code
        status: u16,
        /// Decoder error
        #[source]
        source: CodecError,
        /// Raw response body (lossy UTF-8)
        body: String,
    },

    /// The API reported an error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The envelope body did not match the expected resource type
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RestError {
    /// Get the API error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this error came from the API (application or HTTP status)
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Check if the network call itself failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Status code reported by the API, if any
    pub fn status_code(&self) -> Option<i32> {
        self.api_error().map(|err| err.status_code)
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// What made the API response an error
#[derive(Debug, thiserror::Error)]
pub enum ApiErrorCause {
    /// Known non-success application status code in the envelope
    #[error("application error {0}")]
    Application(i32),

    /// HTTP status code >= 400
    #[error("transport error {0}")]
    Http(u16),

    /// HTTP error whose body was not a valid envelope
    #[error("{0}")]
    Decode(#[source] CodecError),
}

/// Error response from the SwitchBot API
///
/// `status_code` is either the HTTP status (for 4xx/5xx responses) or the
/// application status code carried in the envelope.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP or application status code
    pub status_code: i32,
    /// Message from the envelope, or a default derived from the HTTP status
    pub message: String,
    /// Raw body bytes
    pub body: Vec<u8>,
    /// Underlying cause
    pub cause: Option<ApiErrorCause>,
}

impl ApiError {
    /// Create an API error without a cause
    pub fn new(status_code: i32, message: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            message: message.into(),
            body: body.into(),
            cause: None,
        }
    }

    /// Attach a cause
    pub fn with_cause(mut self, cause: ApiErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Known application status, if `status_code` is one
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_code(self.status_code)
    }

    /// Check if the error was raised because of the HTTP status
    pub fn is_http_error(&self) -> bool {
        matches!(
            self.cause,
            Some(ApiErrorCause::Http(_)) | Some(ApiErrorCause::Decode(_))
        )
    }

    /// Body as text (lossy UTF-8)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwitchBot API error: statusCode={}, message='{}'",
            self.status_code, self.message
        )?;

        if !is_empty_body(&self.body) {
            write!(f, ", body={}", String::from_utf8_lossy(&self.body))?;
        }

        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Check whether a raw body carries no information
///
/// Empty input, `{}` and `null` are empty. Arrays (including `[]`), scalars
/// and non-JSON text are not.
pub fn is_empty_body(body: &[u8]) -> bool {
    body.is_empty() || body == b"{}" || body == b"null"
}
