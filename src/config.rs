//! Configuration loading and management
//!
//! Handles parsing of `tonight.toml` configuration files and environment
//! overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::notifications::DEFAULT_HIDE_AFTER;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Notification configuration
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// API-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the server
    #[serde(default = "default_api_url")]
    pub url: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
        }
    }
}

/// Notification-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays up before auto-expiring, in milliseconds
    #[serde(default = "default_hide_after_ms")]
    pub hide_after_ms: u64,
}

fn default_hide_after_ms() -> u64 {
    DEFAULT_HIDE_AFTER.as_millis() as u64
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            hide_after_ms: default_hide_after_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn hide_after(&self) -> Duration {
        Duration::from_millis(self.hide_after_ms)
    }
}

impl Config {
    /// Load configuration from a `tonight.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the user-level configuration file when present, defaults
    /// otherwise, then apply environment overrides. A file that fails to
    /// parse or validate is an error rather than a silent fallback.
    pub fn load_default() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// The per-user config file location.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tonight")
            .map(|dirs| dirs.config_dir().join("tonight.toml"))
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|err| Error::InvalidConfig(err.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("TONIGHT_API_URL") {
            self.api.url = url;
        }
        if let Ok(raw) = std::env::var("TONIGHT_HIDE_AFTER_MS") {
            self.notifications.hide_after_ms = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("TONIGHT_HIDE_AFTER_MS: '{raw}' is not a number"))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let url = self.api.url.trim();
        if url.is_empty() {
            return Err(Error::InvalidConfig("api.url cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "api.url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.notifications.hide_after_ms == 0 {
            return Err(Error::InvalidConfig(
                "notifications.hide_after_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
