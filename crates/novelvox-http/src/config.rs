//! Public configuration for the backend client.

use std::time::Duration;

use novelvox_core::DEFAULT_API_BASE_URL;

/// Configuration for [`NovelApiClient`](crate::NovelApiClient).
///
/// # Example
///
/// ```
/// use novelvox_http::ApiClientConfig;
/// use std::time::Duration;
///
/// let config = ApiClientConfig::new()
///     .with_base_url("http://192.168.1.20:8000")
///     .with_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend root, without a trailing path.
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Timeout for catalog requests. Synthesis uses the per-request bound.
    pub(crate) timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("novelvox/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL.
    ///
    /// Defaults to `http://localhost:8000`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the catalog request timeout.
    ///
    /// Defaults to 30 seconds. Chapter scraping on the backend is slow, so
    /// this is deliberately longer than the synthesis bounds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.user_agent.starts_with("novelvox/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ApiClientConfig::new()
            .with_base_url("https://reader.example.com")
            .with_user_agent("test-agent/1.0")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url(), "https://reader.example.com");
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
