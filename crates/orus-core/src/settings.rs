//! Gateway configuration.
//!
//! `GatewayConfig` is assembled once at startup from environment variables,
//! validated, and then passed by value to the constructors that need it.
//! Nothing else in the workspace reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default API port.
pub const DEFAULT_PORT: u16 = 9090;

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default gap allowed between two records of a streaming response.
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for a whole backend HTTP call (model pulls are long).
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(2000);

/// Configuration errors detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Ollama base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Filesystem locations handed to the in-process embedding library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmbedderPaths {
    pub agent_memory: Option<PathBuf>,
    pub tokenizer: Option<PathBuf>,
    pub onnx_model: Option<PathBuf>,
    pub onnx_runtime: Option<PathBuf>,
}

impl EmbedderPaths {
    /// Whether every path the embedding library needs is configured.
    pub const fn is_complete(&self) -> bool {
        self.tokenizer.is_some() && self.onnx_model.is_some() && self.onnx_runtime.is_some()
    }
}

/// Runtime configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub ollama_base_url: String,
    pub request_timeout: Duration,
    pub stream_idle_timeout: Duration,
    pub backend_timeout: Duration,
    pub embedder: EmbedderPaths,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stream_idle_timeout: DEFAULT_STREAM_IDLE_TIMEOUT,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            embedder: EmbedderPaths::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source. Unset and blank variables
    /// fall back to defaults; malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let path = |key: &str| var(key).map(PathBuf::from);

        let mut config = Self::default();

        if let Some(host) = var("ORUS_API_HOST") {
            config.host = host;
        }
        if let Some(port) = var("ORUS_API_PORT") {
            config.port = parse_number("ORUS_API_PORT", &port)?;
        }
        if let Some(url) = var("ORUS_OLLAMA_BASE_URL") {
            config.ollama_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = var("ORUS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("ORUS_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = var("ORUS_STREAM_IDLE_TIMEOUT_SECS") {
            config.stream_idle_timeout =
                Duration::from_secs(parse_number("ORUS_STREAM_IDLE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = var("ORUS_BACKEND_TIMEOUT_SECS") {
            config.backend_timeout =
                Duration::from_secs(parse_number("ORUS_BACKEND_TIMEOUT_SECS", &secs)?);
        }

        config.embedder = EmbedderPaths {
            agent_memory: path("ORUS_AGENT_MEMORY_PATH"),
            tokenizer: path("ORUS_TOK_PATH"),
            onnx_model: path("ORUS_ONNX_PATH"),
            onnx_runtime: path("ORUS_ONNX_RUNTIME_PATH"),
        };

        if let Some(origins) = var("ORUS_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the rest of the gateway relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Empty("ORUS_API_HOST"));
        }
        if !(self.ollama_base_url.starts_with("http://")
            || self.ollama_base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidBaseUrl(self.ollama_base_url.clone()));
        }
        for (name, value) in [
            ("ORUS_REQUEST_TIMEOUT_SECS", self.request_timeout),
            ("ORUS_STREAM_IDLE_TIMEOUT_SECS", self.stream_idle_timeout),
            ("ORUS_BACKEND_TIMEOUT_SECS", self.backend_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }
        Ok(())
    }

    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = url.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
