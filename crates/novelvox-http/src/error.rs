//! Error types for backend requests.
//!
//! Port implementations map these to the core port errors at the boundary
//! (see `port.rs`). Only client construction returns [`ApiError`] directly.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for backend requests.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend answered with a non-2xx status.
    #[error("Backend request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// FastAPI `detail` field, when the body carried one
        detail: Option<String>,
    },

    /// The request did not complete in time.
    #[error("Request to {url} timed out after {}ms", .after.as_millis())]
    Timeout {
        url: String,
        after: Duration,
    },

    /// Backend returned a body with an unexpected shape.
    #[error("Invalid response from backend: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = ApiError::Status {
            status: 500,
            url: "http://localhost:8000/tts".to_string(),
            detail: Some("Error in text-to-speech conversion".to_string()),
        };
        let msg = error.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("/tts"));
    }

    #[test]
    fn test_timeout_error_message() {
        let error = ApiError::Timeout {
            url: "http://localhost:8000/tts".to_string(),
            after: Duration::from_secs(10),
        };
        assert!(error.to_string().contains("10000ms"));
    }

    #[test]
    fn test_url_error_conversion() {
        let err: ApiError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
