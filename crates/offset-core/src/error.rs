//! Common error type for a control run

use thiserror::Error;

/// Result type for control operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can abort a control run.
///
/// Client crates keep their own richer error enums and convert into this one
/// at the trait boundary. None of these are retried.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Gateway refuses logins for the given number of seconds
    #[error("Gateway login blocked for {seconds} seconds")]
    Lockout { seconds: u64 },

    /// Gateway issued a challenge with an unsupported protocol version
    #[error("Unsupported authentication version: {0}")]
    UnsupportedVersion(String),

    /// Credentials rejected by the gateway
    #[error("Gateway authentication failed - invalid credentials")]
    AuthFailed,

    /// An expected field was missing or malformed in a response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A remote service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network or client-side failure before a status was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device list is empty
    #[error("No thermostat devices configured")]
    NoDevices,

    /// The weather source found no reachable compatible station
    #[error("No room temperature available from the weather source")]
    NoTemperature,
}

impl ControlError {
    /// Create an HTTP error from status code and message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }
}
