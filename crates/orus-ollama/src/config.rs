//! Public configuration for the Ollama client.

use std::time::Duration;

/// Configuration for [`OllamaClient`](crate::OllamaClient).
///
/// # Example
///
/// ```
/// use orus_ollama::OllamaClientConfig;
/// use std::time::Duration;
///
/// let config = OllamaClientConfig::new()
///     .with_base_url("http://ollama:11434")
///     .with_timeout(Duration::from_secs(600));
/// assert_eq!(config.base_url(), "http://ollama:11434");
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClientConfig {
    /// Base URL of the Ollama server, without trailing slash.
    pub(crate) base_url: String,
    /// Timeout for a whole request, body included.
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) pool_max_idle_per_host: usize,
}

impl Default for OllamaClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            timeout: Duration::from_secs(2000),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("orus-ollama/", env!("CARGO_PKG_VERSION")).to_string(),
            pool_max_idle_per_host: 16,
        }
    }
}

impl OllamaClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Ollama base URL. A trailing slash is dropped.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the whole-request timeout.
    ///
    /// Defaults to 2000 seconds, long enough for large model pulls.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Maximum idle pooled connections kept per host.
    #[must_use]
    pub const fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
