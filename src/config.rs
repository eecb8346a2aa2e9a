//! Configuration Management
//!
//! Handles persistent configuration storage for the `cortex` CLI.

use crate::transport::Settings;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Server API root
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cortex").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from an explicit path; missing or unreadable files give defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
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
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective base URL (CLI > config > CORTEX_URL > default)
    pub fn effective_base_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.base_url.clone())
            .or_else(|| std::env::var("CORTEX_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective token (CLI > config > CORTEX_TOKEN)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.token.clone())
            .or_else(|| std::env::var("CORTEX_TOKEN").ok())
    }

    /// Resolve connection settings for the transport
    pub fn settings(&self, url: Option<&str>, token: Option<&str>) -> Settings {
        Settings::new(&self.effective_base_url(url))
            .with_token(self.effective_token(token))
            .with_timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
    }
}
