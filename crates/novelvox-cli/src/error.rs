//! CLI-specific error types and mappings.
//!
//! Maps engine and backend errors to exit codes and user-facing messages.

use novelvox_core::{NovelSourceError, SettingsError};
use novelvox_player::PlayerError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The novel backend failed or returned something unusable.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Requested novel or chapter does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Playback engine error.
    #[error("Playback error: {0}")]
    Player(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (terminal input, audio device).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Player(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::NotFound(_) => 66, // EX_NOINPUT
            Self::Backend(_) => 69,  // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<NovelSourceError> for CliError {
    fn from(err: NovelSourceError) -> Self {
        match err {
            NovelSourceError::NotFound { what } => Self::NotFound(what),
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<PlayerError> for CliError {
    fn from(err: PlayerError) -> Self {
        match err {
            PlayerError::Output(msg) => Self::Io(format!("audio output: {msg}")),
            other => Self::Player(other.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
