//! Application configuration loaded from `config.yaml` plus environment
//! overrides.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::application::memory_cache::ttl;

/// Top-level application configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Server configuration (host, port, CORS origins)
    pub server: ServerConfig,
    /// Upstream storefront API settings
    pub upstream: UpstreamConfig,
    /// Cache lifetimes
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration settings.
#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on (default: 3010)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated list of allowed CORS origins (default: "*")
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UpstreamConfig {
    /// Storefront API endpoint, e.g. `https://erp.example.com/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_products_ttl_secs")]
    pub products_ttl_secs: u64,
    #[serde(default = "default_taxonomy_ttl_secs")]
    pub taxonomy_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            products_ttl_secs: default_products_ttl_secs(),
            taxonomy_ttl_secs: default_taxonomy_ttl_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3010
}
fn default_allowed_origins() -> String {
    "*".to_string()
}
fn default_request_timeout_secs() -> u64 {
    5
}
fn default_products_ttl_secs() -> u64 {
    ttl::PRODUCTS_SECS
}
fn default_taxonomy_ttl_secs() -> u64 {
    ttl::TAXONOMY_SECS
}

impl Config {
    /// Parse YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content)
            .context("Failed to parse config.yaml - check YAML syntax and structure")
    }

    /// Read and parse a config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read {} - ensure file exists in working directory",
                path.display()
            )
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `UPSTREAM_API_URL` and `PORT` take precedence over the file.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("UPSTREAM_API_URL").filter(|u| !u.trim().is_empty()) {
            self.upstream.base_url = url;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }
}
