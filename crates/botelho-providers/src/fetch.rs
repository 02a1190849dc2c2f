//! HTTP GET fetcher shared by every remote source.
//!
//! One [`Fetcher`] wraps a single reqwest client built with the configured
//! timeout and user agent. Each call is one GET with no retries. Non-2xx
//! answers still return their body: the sources decide what a body means.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};

/// Default timeout for a whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("botelho/", env!("CARGO_PKG_VERSION"));

/// Configuration for a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for a whole request (connect + body).
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Performs GET requests. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher from the given configuration.
    pub fn new(config: &FetchConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the raw body.
    pub async fn get_bytes(&self, url: &str) -> ProviderResult<Vec<u8>> {
        trace!(url = %url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = %status, "non-success status, using body anyway");
        }

        let body = response.bytes().await.map_err(|e| map_error(url, e))?;
        trace!(url = %url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }

    /// Fetches `url` as text. Invalid UTF-8 is replaced.
    pub async fn get_text(&self, url: &str) -> ProviderResult<String> {
        let body = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Fetches `url` and decodes the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|e| {
            ProviderError::decode(format!("invalid JSON from {}: {}", url, e)).with_source(e)
        })
    }
}

fn map_error(url: &str, e: reqwest::Error) -> ProviderError {
    let err = if e.is_timeout() {
        ProviderError::timeout(format!("request to {} timed out", url))
    } else if e.is_builder() {
        ProviderError::configuration(format!("invalid request to {}: {}", url, e))
    } else {
        ProviderError::transport(format!("request to {} failed: {}", url, e))
    };
    err.with_source(e)
}
