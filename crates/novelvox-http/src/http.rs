//! HTTP backend abstraction.
//!
//! The client talks to the backend through [`HttpBackend`] so request
//! building and response mapping can be tested against canned responses.
//! The production implementation uses reqwest and performs exactly one
//! request per call.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::error_detail;

/// A binary response body and its reported MIME type.
#[derive(Debug, Clone)]
pub struct BinaryBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Transport used by the client.
///
/// This is an implementation detail; external code goes through the core
/// port traits.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET a URL and deserialize the JSON body.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T>;

    /// POST a JSON body and return the raw response bytes.
    ///
    /// `timeout` bounds the whole exchange, including reading the body.
    async fn post_json_for_bytes(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> ApiResult<BinaryBody>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &ApiClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Send a request, turning non-2xx statuses into [`ApiError::Status`].
    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> ApiResult<reqwest::Response> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            detail: error_detail(&body),
        })
    }
}

/// reqwest reports timeouts as ordinary errors; split them out.
fn classify(err: reqwest::Error, url: &Url, after: Duration) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            url: url.to_string(),
            after,
        }
    } else {
        ApiError::Network(err)
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
        let request = self.client.get(url.as_str());
        let response = self.send(url, request, self.timeout).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, url, self.timeout))?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_json_for_bytes(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> ApiResult<BinaryBody> {
        let request = self.client.post(url.as_str()).json(body);
        let response = self.send(url, request, timeout).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        Ok(BinaryBody {
            bytes,
            content_type,
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reqwest_backend_creation() {
        let config = ApiClientConfig::new().with_timeout(Duration::from_secs(7));
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_fake_backend_returns_canned_json() {
        let backend = FakeBackend::new()
            .with_response("/novels", CannedResponse::Json(json!(["a", "b"])));

        let url = Url::parse("http://localhost:8000/novels").unwrap();
        let result: Vec<String> = backend.get_json(&url).await.unwrap();
        assert_eq!(result, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fake_backend_returns_404_for_unknown_url() {
        let backend = FakeBackend::new();
        let url = Url::parse("http://localhost:8000/unknown").unwrap();

        let result: ApiResult<serde_json::Value> = backend.get_json(&url).await;
        assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fake_backend_records_post_timeout() {
        let backend = FakeBackend::new()
            .with_response("/tts", CannedResponse::Audio(Bytes::from_static(b"ID3")));

        let url = Url::parse("http://localhost:8000/tts").unwrap();
        let body = backend
            .post_json_for_bytes(&url, &json!({"text": "hi"}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body.bytes.as_ref(), b"ID3");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout, Some(Duration::from_secs(5)));
    }
}
