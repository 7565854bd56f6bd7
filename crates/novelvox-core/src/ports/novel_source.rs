//! Novel catalog port: novel names, chapter lists and chapter text.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChapterInfo, Paragraphs};

/// Errors from catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NovelSourceError {
    /// The requested novel or chapter does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up
        what: String,
    },

    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("Catalog server returned status {status}")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid catalog response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },
}

/// Result type alias for catalog operations.
pub type NovelSourceResult<T> = Result<T, NovelSourceError>;

/// Port trait for the novel catalog backend.
#[async_trait]
pub trait NovelSourcePort: Send + Sync {
    /// List all known novel names.
    async fn list_novels(&self) -> NovelSourceResult<Vec<String>>;

    /// List a novel's chapters in reading order.
    async fn list_chapters(&self, novel: &str) -> NovelSourceResult<Vec<ChapterInfo>>;

    /// Fetch one chapter's paragraphs.
    ///
    /// Implementations build the result with [`Paragraphs::from_chapter`],
    /// so blank paragraphs never reach the player.
    async fn chapter_content(&self, novel: &str, chapter: u32) -> NovelSourceResult<Paragraphs>;
}
