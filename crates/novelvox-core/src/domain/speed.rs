//! Enumerated playback speed multipliers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Playback rate applied by the audio engine.
///
/// Speed changes the render rate only; the synthesized audio is identical
/// for every speed, so it is not part of the cache key by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum PlaybackSpeed {
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Double,
}

impl PlaybackSpeed {
    /// Every supported speed, slowest first.
    pub const ALL: [Self; 7] = [
        Self::Half,
        Self::ThreeQuarters,
        Self::Normal,
        Self::OneAndQuarter,
        Self::OneAndHalf,
        Self::OneAndThreeQuarters,
        Self::Double,
    ];

    /// Rate multiplier (1.0 = normal).
    #[must_use]
    pub const fn as_f32(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::ThreeQuarters => 0.75,
            Self::Normal => 1.0,
            Self::OneAndQuarter => 1.25,
            Self::OneAndHalf => 1.5,
            Self::OneAndThreeQuarters => 1.75,
            Self::Double => 2.0,
        }
    }

    /// Look up the enumerated speed closest to `rate`, if within 0.01.
    #[must_use]
    pub fn from_rate(rate: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| (s.as_f32() - rate).abs() < 0.01)
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.as_f32()
    }
}

/// Returned when a value is not one of the enumerated speeds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported playback speed '{0}' (expected one of 0.5, 0.75, 1, 1.25, 1.5, 1.75, 2)")]
pub struct ParseSpeedError(pub String);

impl TryFrom<f32> for PlaybackSpeed {
    type Error = ParseSpeedError;

    fn try_from(rate: f32) -> Result<Self, Self::Error> {
        Self::from_rate(rate).ok_or_else(|| ParseSpeedError(rate.to_string()))
    }
}

impl FromStr for PlaybackSpeed {
    type Err = ParseSpeedError;

    /// Accepts `1.25`, `1.25x` and `1.25X`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['x', 'X']);
        trimmed
            .parse::<f32>()
            .ok()
            .and_then(Self::from_rate)
            .ok_or_else(|| ParseSpeedError(s.to_string()))
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f32())
    }
}
