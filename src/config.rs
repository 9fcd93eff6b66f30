// src/config.rs
//! Configuration file parsing for the mirror
//!
//! Supports TOML configuration files with the following sections:
//! - [server] - Bind address
//! - [storage] - Data directory holding the manifest and blobs
//! - [fetch] - Archive download timeout and User-Agent

use crate::fetch::{DEFAULT_USER_AGENT, HttpFetcher};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct MirrorConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSection,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSection,

    /// Fetch settings
    #[serde(default)]
    pub fetch: FetchSection,
}

/// [server] section
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// Address the HTTP API listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// [storage] section
#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// Data directory (manifest.json plus one <hash>.zip per archive)
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("data")
}

/// [fetch] section
#[derive(Debug, Deserialize)]
pub struct FetchSection {
    /// Download timeout ("30s", "2m", ...)
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl MirrorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MirrorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        let timeout = self.fetch_timeout()?;
        if timeout.is_zero() {
            anyhow::bail!("fetch.timeout must be greater than zero");
        }

        if self.fetch.user_agent.trim().is_empty() {
            anyhow::bail!("fetch.user_agent must not be empty");
        }

        if self.storage.root.as_os_str().is_empty() {
            anyhow::bail!("storage.root must not be empty");
        }

        Ok(())
    }

    /// Parse the server bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("Invalid server.bind address: {}", self.server.bind))
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.storage.root
    }

    /// Parse fetch timeout to Duration
    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_duration(&self.fetch.timeout)
            .with_context(|| format!("Invalid fetch.timeout: {}", self.fetch.timeout))
    }

    /// Build the HTTP fetcher described by the [fetch] section
    pub fn http_fetcher(&self) -> Result<HttpFetcher> {
        let fetcher = HttpFetcher::with_options(self.fetch_timeout()?, &self.fetch.user_agent)?;
        Ok(fetcher)
    }
}

/// Parse a human-readable duration string (e.g., "15m", "1h", "30s")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(n) = s.strip_suffix("ms") {
        let num: u64 = n
            .trim()
            .parse()
            .with_context(|| format!("Invalid duration number: {n}"))?;
        return Ok(Duration::from_millis(num));
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Assume seconds
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration number: {num_str}"))?;

    let secs = num
        .checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {s}"))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(" 10S ").unwrap(), Duration::from_secs(10));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_parse_duration_overflow() {
        let err = parse_duration("99999999999999999h").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert_eq!(
            parse_duration("18446744073709551615s").unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::new();
        config.validate().unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
        assert_eq!(config.data_dir(), Path::new("data"));
        assert_eq!(config.fetch_timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mirror.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "127.0.0.1:9000"

[fetch]
timeout = "2m"
"#,
        )
        .unwrap();

        let config = MirrorConfig::load(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.fetch_timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.storage.root, PathBuf::from("data"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MirrorConfig::new();
        config.server.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = MirrorConfig::new();
        config.fetch.timeout = "0s".to_string();
        assert!(config.validate().is_err());

        let mut config = MirrorConfig::new();
        config.fetch.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = MirrorConfig::load(Path::new("/nonexistent/mirror.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
