//! Player settings types and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The CLI
//! builds them from flags and environment; the player reads the effective
//! values.

use serde::{Deserialize, Serialize};

use crate::domain::{PlaybackSpeed, Voice};

/// Backend assumed when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Paragraphs ahead of the current one to synthesize speculatively.
pub const DEFAULT_PREFETCH_WINDOW: usize = 3;

/// Upper bound accepted by [`validate_settings`].
pub const MAX_PREFETCH_WINDOW: usize = 10;

/// Reader settings.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerSettings {
    /// Base URL of the scraping/TTS backend.
    pub api_base_url: Option<String>,

    /// Narrator voice.
    pub voice: Option<Voice>,

    /// Playback rate.
    pub speed: Option<PlaybackSpeed>,

    /// Prefetch window (0 disables prefetching).
    pub prefetch_window: Option<usize>,
}

impl PlayerSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            voice: Some(Voice::default()),
            speed: Some(PlaybackSpeed::default()),
            prefetch_window: Some(DEFAULT_PREFETCH_WINDOW),
        }
    }

    #[must_use]
    pub fn effective_api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    #[must_use]
    pub fn effective_voice(&self) -> Voice {
        self.voice.unwrap_or_default()
    }

    #[must_use]
    pub fn effective_speed(&self) -> PlaybackSpeed {
        self.speed.unwrap_or_default()
    }

    #[must_use]
    pub const fn effective_prefetch_window(&self) -> usize {
        match self.prefetch_window {
            Some(window) => window,
            None => DEFAULT_PREFETCH_WINDOW,
        }
    }

    /// Merge an update into these settings, only touching fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref url) = other.api_base_url {
            self.api_base_url.clone_from(url);
        }
        if let Some(voice) = other.voice {
            self.voice = voice;
        }
        if let Some(speed) = other.speed {
            self.speed = speed;
        }
        if let Some(window) = other.prefetch_window {
            self.prefetch_window = window;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub api_base_url: Option<Option<String>>,
    pub voice: Option<Option<Voice>>,
    pub speed: Option<Option<PlaybackSpeed>>,
    pub prefetch_window: Option<Option<usize>>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Prefetch window must be at most {MAX_PREFETCH_WINDOW}, got {0}")]
    InvalidPrefetchWindow(usize),

    #[error("API base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("API base URL must start with http:// or https://, got {0}")]
    InvalidBaseUrl(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &PlayerSettings) -> Result<(), SettingsError> {
    if let Some(window) = settings.prefetch_window {
        if window > MAX_PREFETCH_WINDOW {
            return Err(SettingsError::InvalidPrefetchWindow(window));
        }
    }

    if let Some(url) = settings.api_base_url.as_deref() {
        let url = url.trim();
        if url.is_empty() {
            return Err(SettingsError::EmptyBaseUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidBaseUrl(url.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlayerSettings::with_defaults();
        assert_eq!(settings.effective_api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(settings.effective_voice(), Voice::Christopher);
        assert_eq!(settings.effective_speed(), PlaybackSpeed::Normal);
        assert_eq!(settings.effective_prefetch_window(), 3);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_empty_settings_fall_back() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.effective_prefetch_window(), DEFAULT_PREFETCH_WINDOW);
        assert_eq!(settings.effective_voice(), Voice::default());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_merge_partial_update() {
        let mut settings = PlayerSettings::with_defaults();
        let update = SettingsUpdate {
            voice: Some(Some(Voice::Jenny)),
            prefetch_window: Some(None),
            ..Default::default()
        };
        settings.merge(&update);

        assert_eq!(settings.voice, Some(Voice::Jenny));
        assert_eq!(settings.prefetch_window, None);
        assert_eq!(settings.speed, Some(PlaybackSpeed::Normal));
        assert_eq!(settings.effective_prefetch_window(), DEFAULT_PREFETCH_WINDOW);
    }

    #[test]
    fn test_validate_prefetch_window() {
        let mut settings = PlayerSettings::with_defaults();
        settings.prefetch_window = Some(0);
        assert!(validate_settings(&settings).is_ok());

        settings.prefetch_window = Some(MAX_PREFETCH_WINDOW);
        assert!(validate_settings(&settings).is_ok());

        settings.prefetch_window = Some(11);
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPrefetchWindow(11))
        );
    }

    #[test]
    fn test_validate_base_url() {
        let mut settings = PlayerSettings::with_defaults();
        settings.api_base_url = Some("   ".to_string());
        assert_eq!(validate_settings(&settings), Err(SettingsError::EmptyBaseUrl));

        settings.api_base_url = Some("localhost:8000".to_string());
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidBaseUrl(_))
        ));

        settings.api_base_url = Some("https://reader.example.com".to_string());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_settings_json_shape() {
        let settings: PlayerSettings = serde_json::from_str(
            r#"{"voice": "en-GB-SoniaNeural", "speed": 1.5, "prefetch_window": 2}"#,
        )
        .unwrap();
        assert_eq!(settings.voice, Some(Voice::Sonia));
        assert_eq!(settings.speed, Some(PlaybackSpeed::OneAndHalf));
        assert_eq!(settings.prefetch_window, Some(2));
        assert_eq!(settings.api_base_url, None);
    }
}
