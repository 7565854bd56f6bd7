//! Enumerated narration voices.
//!
//! The synthesis backend accepts Edge neural voice identifiers. Only the
//! voices listed here are offered to users; the identifier is what goes over
//! the wire and into cache keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Voice gender, used for grouping in voice pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

/// A narration voice supported by the synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Voice {
    #[default]
    #[serde(rename = "en-US-ChristopherNeural")]
    Christopher,
    #[serde(rename = "en-US-GuyNeural")]
    Guy,
    #[serde(rename = "en-US-EricNeural")]
    Eric,
    #[serde(rename = "en-US-JennyNeural")]
    Jenny,
    #[serde(rename = "en-US-AriaNeural")]
    Aria,
    #[serde(rename = "en-US-MichelleNeural")]
    Michelle,
    #[serde(rename = "en-GB-RyanNeural")]
    Ryan,
    #[serde(rename = "en-GB-SoniaNeural")]
    Sonia,
}

impl Voice {
    /// Every supported voice, in display order.
    pub const ALL: [Self; 8] = [
        Self::Christopher,
        Self::Guy,
        Self::Eric,
        Self::Jenny,
        Self::Aria,
        Self::Michelle,
        Self::Ryan,
        Self::Sonia,
    ];

    /// Backend voice identifier (e.g. `en-US-ChristopherNeural`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Christopher => "en-US-ChristopherNeural",
            Self::Guy => "en-US-GuyNeural",
            Self::Eric => "en-US-EricNeural",
            Self::Jenny => "en-US-JennyNeural",
            Self::Aria => "en-US-AriaNeural",
            Self::Michelle => "en-US-MichelleNeural",
            Self::Ryan => "en-GB-RyanNeural",
            Self::Sonia => "en-GB-SoniaNeural",
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Christopher => "Christopher",
            Self::Guy => "Guy",
            Self::Eric => "Eric",
            Self::Jenny => "Jenny",
            Self::Aria => "Aria",
            Self::Michelle => "Michelle",
            Self::Ryan => "Ryan",
            Self::Sonia => "Sonia",
        }
    }

    /// BCP-47 locale of the voice.
    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::Ryan | Self::Sonia => "en-GB",
            _ => "en-US",
        }
    }

    #[must_use]
    pub const fn gender(self) -> VoiceGender {
        match self {
            Self::Christopher | Self::Guy | Self::Eric | Self::Ryan => VoiceGender::Male,
            Self::Jenny | Self::Aria | Self::Michelle | Self::Sonia => VoiceGender::Female,
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a string names no supported voice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown voice '{0}'")]
pub struct ParseVoiceError(pub String);

impl FromStr for Voice {
    type Err = ParseVoiceError;

    /// Accepts either the backend identifier or the short display name,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.id().eq_ignore_ascii_case(wanted) || v.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseVoiceError(s.to_string()))
    }
}
