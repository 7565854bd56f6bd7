//! Port trait implementations for `NovelApiClient`.
//!
//! Maps internal [`ApiError`]s onto the core port errors and shapes raw
//! responses into domain types.

use async_trait::async_trait;
use novelvox_core::{
    AudioClip, ChapterInfo, NovelSourceError, NovelSourcePort, NovelSourceResult, Paragraphs,
    SpeechClientPort, SpeechError, SpeechRequest, SpeechResult,
};

use crate::client::NovelApiClient;
use crate::error::ApiError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

fn map_speech_error(err: ApiError) -> SpeechError {
    match err {
        ApiError::Status { status, detail, .. } => {
            if let Some(detail) = detail {
                tracing::debug!(status, %detail, "Synthesis backend error");
            }
            SpeechError::Server { status }
        }
        ApiError::Timeout { after, .. } => SpeechError::Timeout { after },
        other => SpeechError::Network {
            message: other.to_string(),
        },
    }
}

fn map_source_error(err: ApiError, what: impl FnOnce() -> String) -> NovelSourceError {
    match err {
        ApiError::Status { status: 404, .. } => NovelSourceError::NotFound { what: what() },
        ApiError::Status { status, detail, .. } => {
            if let Some(detail) = detail {
                tracing::debug!(status, %detail, "Catalog backend error");
            }
            NovelSourceError::Server { status }
        }
        ApiError::InvalidResponse { message } => NovelSourceError::InvalidResponse { message },
        ApiError::JsonParse(e) => NovelSourceError::InvalidResponse {
            message: e.to_string(),
        },
        other @ (ApiError::Timeout { .. } | ApiError::Network(_) | ApiError::InvalidUrl(_)) => {
            NovelSourceError::Network {
                message: other.to_string(),
            }
        }
    }
}

// ============================================================================
// Port Implementations
// ============================================================================

#[async_trait]
impl<B: HttpBackend> SpeechClientPort for NovelApiClient<B> {
    async fn synthesize(&self, request: &SpeechRequest) -> SpeechResult<AudioClip> {
        self.fetch_speech(request.text(), request.voice(), request.timeout())
            .await
            .map_err(map_speech_error)
    }
}

#[async_trait]
impl<B: HttpBackend> NovelSourcePort for NovelApiClient<B> {
    async fn list_novels(&self) -> NovelSourceResult<Vec<String>> {
        self.fetch_novels()
            .await
            .map_err(|e| map_source_error(e, || "novel list".to_string()))
    }

    async fn list_chapters(&self, novel: &str) -> NovelSourceResult<Vec<ChapterInfo>> {
        self.fetch_chapters(novel)
            .await
            .map_err(|e| map_source_error(e, || format!("novel '{novel}'")))
    }

    async fn chapter_content(&self, novel: &str, chapter: u32) -> NovelSourceResult<Paragraphs> {
        let raw = self
            .fetch_chapter_content(novel, chapter)
            .await
            .map_err(|e| map_source_error(e, || format!("chapter {chapter} of '{novel}'")))?;

        let paragraphs = Paragraphs::from_chapter(&raw);
        tracing::debug!(
            novel,
            chapter,
            received = raw.len(),
            kept = paragraphs.len(),
            "Fetched chapter content"
        );
        Ok(paragraphs)
    }
}
