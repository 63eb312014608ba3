//! Configuration management for loginwall.
//!
//! Configuration is loaded from `~/.loginwall/config.toml` with sensible defaults.
//! All config structs implement `Default` so a missing file still yields a
//! working server.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for loginwall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Object store settings
    pub storage: StorageConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Upload form settings
    pub upload: UploadConfig,

    /// Static asset settings
    pub assets: AssetsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.loginwall.loginwall/config.toml
    /// - Linux: ~/.config/loginwall/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\loginwall\config\config.toml
    ///
    /// Falls back to ~/.loginwall/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "loginwall", "loginwall")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".loginwall").join("config.toml")
            })
    }

    /// Get the resolved object store directory (with ~ expansion).
    pub fn storage_dir(&self) -> PathBuf {
        let path_str = self.storage.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Get the resolved stylesheet directory (with ~ expansion).
    pub fn css_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.assets.css_dir);
        PathBuf::from(expanded.into_owned())
    }

    /// Absolute route for a path below the configured prefix.
    ///
    /// `route("/upload")` is `/mac-login-wp/upload` with the default prefix.
    pub fn route(&self, suffix: &str) -> String {
        format!("{}{}", self.server.route_prefix, suffix)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
