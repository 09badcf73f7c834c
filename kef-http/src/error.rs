//! Error types for the HTTP client

use thiserror::Error;

/// Errors that can occur while talking to a speaker's web API
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection refused, DNS failure, timeout or a broken transfer
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The speaker answered with a non-success status code
    #[error("HTTP status {0}")]
    Status(u16),

    /// The body was not the JSON the API promises
    #[error("JSON parsing error: {0}")]
    Parse(String),
}

impl HttpError {
    /// True when the request never produced an HTTP answer
    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::Network(_))
    }
}

impl From<ureq::Error> for HttpError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(code, _) => HttpError::Status(code),
            ureq::Error::Transport(transport) => HttpError::Network(transport.to_string()),
        }
    }
}
