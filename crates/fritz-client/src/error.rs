//! Error types for gateway operations

use offset_core::ControlError;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, FritzError>;

/// Errors that can occur while talking to the gateway
#[derive(Error, Debug)]
pub enum FritzError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Gateway returned a non-success status
    #[error("Gateway error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Expected field missing or malformed
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Challenge version other than "2"
    #[error("Unsupported authentication version: {0}")]
    UnsupportedVersion(String),

    /// Gateway refuses logins for a while after failed attempts
    #[error("Login blocked for {seconds} seconds")]
    Lockout { seconds: u64 },

    /// Gateway answered the login with the zero session id
    #[error("Authentication failed - invalid credentials")]
    AuthFailed,

    /// Authorized request issued without a session
    #[error("Not authenticated - call ensure_authenticated first")]
    NotAuthenticated,
}

impl FritzError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}

impl From<FritzError> for ControlError {
    fn from(e: FritzError) -> Self {
        match e {
            FritzError::Lockout { seconds } => ControlError::Lockout { seconds },
            FritzError::UnsupportedVersion(v) => ControlError::UnsupportedVersion(v),
            FritzError::AuthFailed => ControlError::AuthFailed,
            FritzError::ParseError(msg) => ControlError::Parse(msg),
            FritzError::ServerError { status, message } => ControlError::Http { status, message },
            other => ControlError::Transport(other.to_string()),
        }
    }
}
