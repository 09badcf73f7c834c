use kef_http::HttpError;
use thiserror::Error;

/// High-level API errors for KEF speaker operations
///
/// This enum abstracts away the HTTP transport and gives callers one place
/// to decide whether a failure means "the speaker is unreachable" or "the
/// speaker said something we did not understand".
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, DNS resolution failure, timeout, or the device
    /// dropping the connection mid-answer.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The speaker answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Response parsing error
    ///
    /// The speaker answered, but the JSON did not have the expected shape:
    /// an empty node list, a leaf of the wrong type, an unknown enum value.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid parameter value
    ///
    /// Returned before any request is sent, e.g. for an unknown source name.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ApiError {
    /// True when the speaker could not be reached or refused to answer
    ///
    /// This is the condition the setup flow reports as "cannot connect".
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ApiError::NetworkError(_) | ApiError::HttpStatus(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convert from HttpError to ApiError
impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Network(msg) => ApiError::NetworkError(msg),
            HttpError::Status(code) => ApiError::HttpStatus(code),
            HttpError::Parse(msg) => ApiError::ParseError(msg),
        }
    }
}
