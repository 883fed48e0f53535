use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{ExporterError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between two poll ticks
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Display names of the labels to export
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            labels: Vec::new(),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 2112))
}

fn default_path() -> String {
    "/metrics".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load and validate the configuration file.
    ///
    /// A missing file is an error: the exporter has nothing to do without
    /// a label list.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ExporterError::ConfigError(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::parse(&content)?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// A file that exists and fails to parse or validate is still an error.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ExporterError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExporterError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ExporterError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ExporterError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // A zero interval would turn the poller into a busy loop
        if self.interval == 0 {
            return Err(ExporterError::ConfigError(
                "interval must be at least 1 second".to_string(),
            ));
        }

        if self.labels.iter().any(|label| label.is_empty()) {
            return Err(ExporterError::ConfigError(
                "labels cannot contain empty strings".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ExporterError::ConfigError(format!(
                "server.path must start with '/', got '{}'",
                self.server.path
            )));
        }

        // The path is registered as a literal route; capture syntax is refused
        if self.server.path.contains(['{', '}'])
            || self
                .server
                .path
                .split('/')
                .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
        {
            return Err(ExporterError::ConfigError(format!(
                "server.path must be a literal path without ':', '*', '{{' or '}}' segments, got '{}'",
                self.server.path
            )));
        }

        if self.client.request_timeout_secs == 0 {
            return Err(ExporterError::ConfigError(
                "client.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.labels.is_empty() {
            tracing::warn!("No labels configured, only exporter metrics will be served");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.client.request_timeout_secs)
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self {
            labels: vec!["INBOX".to_string(), "UNREAD".to_string()],
            ..Self::default()
        };
        config.save(path).await
    }
}
