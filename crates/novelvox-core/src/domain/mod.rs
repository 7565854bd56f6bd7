//! Domain types for the reader.
//!
//! Pure data with no infrastructure dependencies: the enumerated voice and
//! speed sets that make up the configuration surface, chapter metadata from
//! the catalog, synthesized audio payloads, and the paragraph sequence the
//! player narrates.

mod audio;
mod novel;
mod paragraphs;
mod speed;
mod voice;

pub use audio::AudioClip;
pub use novel::ChapterInfo;
pub use paragraphs::{Paragraphs, normalize_text};
pub use speed::{ParseSpeedError, PlaybackSpeed};
pub use voice::{ParseVoiceError, Voice, VoiceGender};
