//! Player error types.

use std::time::Duration;

use novelvox_core::SpeechError;

/// Errors surfaced by the player.
///
/// Cloneable so a single load failure can be handed to every caller that
/// coalesced onto it, and kept in the session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// Paragraph text was empty or whitespace-only. Never retried.
    #[error("Paragraph is empty")]
    EmptyInput,

    /// Synthesis request got no response.
    #[error("Network error: {0}")]
    Network(String),

    /// Synthesis backend answered with a non-2xx status.
    #[error("Synthesis server returned status {0}")]
    Server(u16),

    /// Synthesis did not complete within its bound.
    #[error("Synthesis timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Audio bytes could not be decoded, or a cached sound failed validation.
    #[error("Audio is not playable: {0}")]
    DecodeInvalid(String),

    /// A paragraph transition did not resolve in time.
    #[error("playback stopped")]
    StuckTransition,

    /// The load was abandoned (evicted, superseded or shut down).
    #[error("Load cancelled")]
    Cancelled,

    /// The operation is not valid in the current state.
    #[error("Cannot {op} while {state}")]
    Rejected {
        op: &'static str,
        state: String,
    },

    /// Start index does not address a paragraph.
    #[error("Paragraph {index} is out of range (chapter has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Audio device or sound operation failure.
    #[error("Audio output error: {0}")]
    Output(String),

    /// The player has been closed.
    #[error("Player is closed")]
    Closed,
}

impl PlayerError {
    /// Network-level failures that the foreground retry policy re-attempts.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server(_) | Self::Timeout(_))
    }
}

impl From<SpeechError> for PlayerError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::EmptyInput => Self::EmptyInput,
            SpeechError::Network { message } => Self::Network(message),
            SpeechError::Server { status } => Self::Server(status),
            SpeechError::Timeout { after } => Self::Timeout(after),
        }
    }
}
