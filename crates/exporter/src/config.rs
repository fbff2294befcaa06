//! Exporter configuration

use anyhow::{bail, Result};
use exporter_lib::client::DEFAULT_API_URL;
use serde::Deserialize;
use std::time::Duration;

/// Exporter configuration, read from the process environment
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// DigitalOcean API token
    #[serde(default)]
    pub digitalocean_token: Option<String>,

    /// Spaces access key id; bucket metrics need both key and secret
    #[serde(default)]
    pub digitalocean_spaces_access_key_id: Option<String>,

    #[serde(default)]
    pub digitalocean_spaces_access_key_secret: Option<String>,

    #[serde(default = "default_api_url")]
    pub digitalocean_api_url: String,

    /// Upstream request timeout in milliseconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    /// Listen address, `:port` binds every interface
    #[serde(default = "default_web_addr")]
    pub web_addr: String,

    /// Path serving the metrics
    #[serde(default = "default_web_path")]
    pub web_path: String,

    /// Debug level logging
    #[serde(default)]
    pub debug: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_http_timeout() -> u64 {
    5000
}

fn default_web_addr() -> String {
    ":9212".to_string()
}

fn default_web_path() -> String {
    "/metrics".to_string()
}

impl ExporterConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder().add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token().is_none() {
            bail!("DIGITALOCEAN_TOKEN is required");
        }
        if self.http_timeout == 0 {
            bail!("HTTP_TIMEOUT must be greater than 0");
        }
        if !self.web_path.starts_with('/') || self.web_path == "/" {
            bail!("WEB_PATH must start with '/' and not be the root path, got {:?}", self.web_path);
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        non_empty(&self.digitalocean_token)
    }

    /// Key id and secret, when both are set
    pub fn spaces_credentials(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(&self.digitalocean_spaces_access_key_id)?,
            non_empty(&self.digitalocean_spaces_access_key_secret)?,
        ))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout)
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> String {
        if self.web_addr.starts_with(':') {
            format!("0.0.0.0{}", self.web_addr)
        } else {
            self.web_addr.clone()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
