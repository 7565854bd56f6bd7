#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AudioClip, ChapterInfo, PlaybackSpeed, Paragraphs, ParseSpeedError, ParseVoiceError, Voice,
    VoiceGender, normalize_text,
};
pub use ports::{
    NovelSourceError, NovelSourcePort, NovelSourceResult, SpeechClientPort, SpeechError,
    SpeechRequest, SpeechResult,
};
pub use settings::{
    DEFAULT_API_BASE_URL, DEFAULT_PREFETCH_WINDOW, MAX_PREFETCH_WINDOW, PlayerSettings,
    SettingsError, SettingsUpdate, validate_settings,
};

// Silence unused dev-dependency warnings for the lib test harness
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio as _;
