//! Backend client: URL building and response shaping for every endpoint.

use std::time::Duration;

use novelvox_core::{AudioClip, ChapterInfo, Voice};
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::ApiResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::{ChapterContentBody, TtsBody};

// ============================================================================
// Type Aliases
// ============================================================================

/// Backend client using the reqwest HTTP backend.
pub type DefaultNovelApiClient = NovelApiClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the scraping and speech backend.
///
/// Generic over the HTTP backend for testing. Use [`DefaultNovelApiClient`]
/// and the core port traits from outside the crate.
pub struct NovelApiClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) base_url: Url,
}

impl DefaultNovelApiClient {
    /// Create a client for the configured backend.
    pub fn new(config: &ApiClientConfig) -> ApiResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self { backend, base_url })
    }
}

impl<B: HttpBackend> NovelApiClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(base_url: Url, backend: B) -> Self {
        Self { backend, base_url }
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) async fn fetch_novels(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint("novels")?;
        self.backend.get_json(&url).await
    }

    pub(crate) async fn fetch_chapters(&self, novel: &str) -> ApiResult<Vec<ChapterInfo>> {
        let url = self.endpoint(&format!("chapters/{}", urlencoding::encode(novel)))?;
        self.backend.get_json(&url).await
    }

    pub(crate) async fn fetch_chapter_content(
        &self,
        novel: &str,
        chapter: u32,
    ) -> ApiResult<Vec<String>> {
        let mut url = self.endpoint("chapter")?;
        url.query_pairs_mut()
            .append_pair("chapterNumber", &chapter.to_string())
            .append_pair("novelName", novel);

        let body: ChapterContentBody = self.backend.get_json(&url).await?;
        Ok(body.content)
    }

    pub(crate) async fn fetch_speech(
        &self,
        text: &str,
        voice: Voice,
        timeout: Duration,
    ) -> ApiResult<AudioClip> {
        let url = self.endpoint("tts")?;
        let body = serde_json::to_value(TtsBody {
            text,
            voice: voice.id(),
        })?;

        tracing::debug!(voice = %voice, chars = text.len(), "Requesting speech");
        let response = self.backend.post_json_for_bytes(&url, &body, timeout).await?;

        let content_type = response
            .content_type
            .unwrap_or_else(|| AudioClip::DEFAULT_CONTENT_TYPE.to_string());
        Ok(AudioClip::new(response.bytes, content_type))
    }
}

/// Parse the configured base URL, making sure relative joins keep any path
/// prefix (`http://host/api` must resolve `tts` to `http://host/api/tts`).
fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}
