//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the player expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or audio types in any signature
//! - Adapters never retry internally; retry policy belongs to the player
//! - Errors are domain-level enums; adapters map their own errors at the boundary

pub mod novel_source;
pub mod speech;

pub use novel_source::{NovelSourceError, NovelSourcePort, NovelSourceResult};
pub use speech::{SpeechClientPort, SpeechError, SpeechRequest, SpeechResult};
