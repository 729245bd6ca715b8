//! Error types for cloud service calls

use offset_core::ControlError;
use thiserror::Error;

/// Result type alias for cloud service calls
pub type Result<T> = std::result::Result<T, CloudError>;

/// Errors that can occur while talking to the cloud services
#[derive(Error, Debug)]
pub enum CloudError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Service returned a non-success status
    #[error("{service} error {status}: {message}")]
    ServerError {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<CloudError> for ControlError {
    fn from(e: CloudError) -> Self {
        match e {
            CloudError::ServerError {
                service,
                status,
                message,
            } => ControlError::Http {
                status,
                message: format!("{}: {}", service, message),
            },
            CloudError::ParseError(msg) => ControlError::Parse(msg),
            other => ControlError::Transport(other.to_string()),
        }
    }
}

/// Best-effort diagnostic for a failed response: the body if there is one,
/// otherwise the status text
pub(crate) async fn extract_error(service: &'static str, response: reqwest::Response) -> CloudError {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    };
    CloudError::ServerError {
        service,
        status: status.as_u16(),
        message,
    }
}
