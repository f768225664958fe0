//! Error types for authentication operations

/// Errors that can occur while building or signing credentials
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid API credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// The operating system random source could not be read
    #[error("Secure random source unavailable: {0}")]
    Entropy(String),

    /// A header value contained bytes that cannot be sent over HTTP
    #[error("Invalid header value for {name}: {reason}")]
    InvalidHeader {
        /// Header name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
