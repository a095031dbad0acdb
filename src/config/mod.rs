//! Configuration file management
//!
//! Loads TOML configuration files and provides bridge settings.
//! Default config path: ~/.config/secondscreen/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, DEFAULT_LOG_FILTER, SYSTEM_CONFIG_PATH};

/// Bridge settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display selection settings
    pub display: DisplayConfig,
    /// Window chrome settings
    pub chrome: ChromeConfig,
    /// Touch input settings
    pub input: InputConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Display selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Fall back to any non-default display when no presentation-capable
    /// display is present
    pub fallback_to_secondary: bool,
    /// DRM device to enumerate connectors from (None = first /dev/dri/card*)
    pub drm_device: Option<PathBuf>,
    /// Re-evaluate the target display on udev hotplug events
    pub watch_hotplug: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fallback_to_secondary: true,
            drm_device: None,
            watch_hotplug: true,
        }
    }
}

/// Window chrome settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Keep the presentation window fullscreen with system bars hidden
    pub immersive: bool,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self { immersive: true }
    }
}

/// Touch input settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Substring of the libinput device name bound to the second display
    /// (empty = every touch device)
    pub touch_device: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter used when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. User config: ~/.config/secondscreen/config.toml
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        // 2. System config: /etc/secondscreen/config.toml
        let system_config = Path::new(SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. ~/.config/secondscreen/config.toml (user config)
    /// 2. /etc/secondscreen/config.toml (system config)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                info!("Using built-in default config");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
}
