// src/fetch.rs

//! Archive fetchers
//!
//! The registrar obtains archive bytes through the [`Fetcher`] trait:
//! - [`HttpFetcher`] downloads over HTTP(S) with reqwest
//! - [`MemoryFetcher`] serves bytes from a map, for tests and offline tooling

use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for archive downloads (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent sent with archive downloads
pub const DEFAULT_USER_AGENT: &str = concat!("ccmod-mirror/", env!("CARGO_PKG_VERSION"));

/// Transport used to obtain a package archive from its source URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the complete body at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// HTTP(S) fetcher using reqwest
///
/// Non-success statuses are errors, so an HTML error page is never stored
/// as if it were an archive.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout and User-Agent
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create with custom options
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::NetworkError(format!("Invalid URL '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::NetworkError(format!(
                "Unsupported URL scheme '{}' in {url}",
                parsed.scheme()
            )));
        }

        debug!("Fetching archive via HTTP: {}", url);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::NetworkError(format!(
                "{url} returned HTTP {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to read body of {url}: {e}")))?;

        debug!("Fetched {} bytes from {}", data.len(), url);
        Ok(data.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Fetcher backed by an in-memory URL map
///
/// Unknown URLs fail with `NetworkError`, the same way an unreachable host
/// would.
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`, replacing any previous body
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.bodies.write().insert(url.into(), body.into());
    }

    pub fn remove(&self, url: &str) -> Option<Vec<u8>> {
        self.bodies.write().remove(url)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.bodies
            .read()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NetworkError(format!("No body registered for {url}")))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
