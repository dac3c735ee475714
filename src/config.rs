//! Configuration Management
//!
//! Handles persistent configuration storage for mdisco.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Region used when nothing else is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Resource type used when nothing else is configured
pub const DEFAULT_RESOURCE_TYPE: &str = "sqs-queues";

/// Environment variable overriding the metrics endpoint
pub const ENDPOINT_ENV: &str = "MDISCO_ENDPOINT";

/// Environment variable holding the API bearer token
pub const TOKEN_ENV: &str = "MDISCO_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Metrics catalog endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Last used region
    #[serde(default)]
    pub region: Option<String>,
    /// Last discovered resource type
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Bearer token sent to the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mdisco").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from(&path)
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective region (config > default)
    pub fn effective_region(&self) -> String {
        self.region
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// Get effective endpoint (env > config > regional default)
    pub fn effective_endpoint(&self) -> String {
        self.resolve_endpoint(std::env::var(ENDPOINT_ENV).ok())
    }

    fn resolve_endpoint(&self, env_endpoint: Option<String>) -> String {
        env_endpoint
            .filter(|e| !e.is_empty())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| default_endpoint(&self.effective_region()))
    }

    /// Record values given explicitly on the command line
    pub fn apply_overrides(&mut self, endpoint: Option<&str>, region: Option<&str>, kind: Option<&str>) {
        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint.to_string());
        }
        if let Some(region) = region {
            self.region = Some(region.to_string());
        }
        if let Some(kind) = kind {
            self.resource_type = Some(kind.to_string());
        }
    }

    /// Get effective resource type (config > default)
    pub fn effective_resource_type(&self) -> String {
        self.resource_type
            .clone()
            .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string())
    }

    /// Get effective API token (env > config)
    pub fn effective_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.api_token.clone())
    }
}

/// Public metrics endpoint for `region`
pub fn default_endpoint(region: &str) -> String {
    format!("https://monitoring.{}.amazonaws.com", region)
}

/// Check that `endpoint` is an absolute http(s) URL
pub fn validate_endpoint(endpoint: &str) -> Result<url::Url> {
    let url = url::Url::parse(endpoint).with_context(|| format!("Invalid endpoint: {}", endpoint))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(anyhow::anyhow!(
            "Unsupported endpoint scheme '{}' (expected http or https)",
            scheme
        )),
    }
}
