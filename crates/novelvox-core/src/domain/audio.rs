use bytes::Bytes;

/// Encoded audio returned by the synthesis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio (e.g. MP3 frames).
    pub bytes: Bytes,

    /// MIME type reported by the backend (e.g. `audio/mpeg`).
    pub content_type: String,
}

impl AudioClip {
    /// MIME type assumed when the backend does not report one.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "audio/mpeg";

    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Wrap MP3 bytes.
    pub fn mpeg(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, Self::DEFAULT_CONTENT_TYPE)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
