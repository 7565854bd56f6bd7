//! Speech synthesis port.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AudioClip, Voice};

/// Errors from speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// Text was empty or whitespace-only. Raised before any network call.
    #[error("Cannot synthesize empty text")]
    EmptyInput,

    /// No response was received (connection refused, DNS, reset).
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("Synthesis server returned status {status}")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// The request did not complete within its time bound.
    #[error("Synthesis timed out after {}ms", .after.as_millis())]
    Timeout {
        /// The bound that was exceeded
        after: Duration,
    },
}

impl SpeechError {
    /// Whether a foreground caller may retry the same request.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Server { .. } | Self::Timeout { .. }
        )
    }
}

/// Result type alias for speech operations.
pub type SpeechResult<T> = Result<T, SpeechError>;

/// A validated synthesis request.
///
/// Construction rejects empty text, so an adapter never sees a request that
/// would waste a network round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    text: String,
    voice: Voice,
    timeout: Duration,
}

impl SpeechRequest {
    /// Bound applied when the caller does not pick one.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a request for `text` read by `voice`.
    ///
    /// Fails with [`SpeechError::EmptyInput`] when `text` is blank.
    pub fn new(text: impl Into<String>, voice: Voice) -> SpeechResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput);
        }
        Ok(Self {
            text,
            voice,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn voice(&self) -> Voice {
        self.voice
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Port trait for the text-to-speech backend.
///
/// Implementations perform exactly one network call per invocation and must
/// honour [`SpeechRequest::timeout`]. They never retry.
#[async_trait]
pub trait SpeechClientPort: Send + Sync {
    /// Synthesize the request's text and return the encoded audio.
    async fn synthesize(&self, request: &SpeechRequest) -> SpeechResult<AudioClip>;
}
