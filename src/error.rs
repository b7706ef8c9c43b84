use thiserror::Error;

/// Errors that can occur while talking to the Celestia backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("{0}")]
    FetchError(#[from] reqwest::Error),

    /// The backend answered with a non-success status code
    #[error("{context}: {status}")]
    StatusError { context: String, status: u16 },

    /// A response was missing a field the caller depends on
    #[error("{0}")]
    ValidationError(String),

    /// The operation needs a backend connection and the client is offline
    #[error("{0}")]
    OfflineError(String),

    /// Input was rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// Local file access failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 payload (image data or credential) could not be decoded
    #[error("Invalid base64 data: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ClientError {
    pub fn status(context: impl Into<String>, status: reqwest::StatusCode) -> Self {
        ClientError::StatusError {
            context: context.into(),
            status: status.as_u16(),
        }
    }

    /// True for failures caused by the network or the backend being unreachable
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ClientError::FetchError(_) | ClientError::StatusError { .. } | ClientError::OfflineError(_)
        )
    }
}
