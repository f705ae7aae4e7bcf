//! Configuration management for smart-volume-adjust
//!
//! This module provides:
//! - The TOML configuration file model with defaults for every key
//! - Validation of the volume bound
//! - Location of the configuration file in the user's config directory

use crate::domain::selector::SelectOptions;
use crate::domain::volume::{VolumeLimit, VolumeParseError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error in {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Volume(#[from] VolumeParseError),
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Send a desktop notification after each change
    pub enabled: bool,

    /// Show the resulting volume instead of the change
    pub absolute: bool,

    /// Expiry in milliseconds, -1 lets the notification server decide
    pub timeout_ms: i32,

    /// Application name reported to the notification server
    pub app_name: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            absolute: false,
            timeout_ms: -1,
            app_name: "smart-volume-adjust".to_string(),
        }
    }
}

/// Audio server access settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Control tool used to talk to the server
    pub pactl: PathBuf,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            pactl: PathBuf::from("pactl"),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustConfig {
    /// Upper bound for any resulting volume (1.0 = 100%)
    pub max_volume: f64,

    /// Patterns used when none are given on the command line
    pub patterns: Vec<String>,

    /// Only consider streams that are playing
    pub filter_active: bool,

    /// Change the default device when no stream matches
    pub default_to_sink: bool,

    pub notify: NotifyConfig,

    pub pulse: PulseConfig,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            max_volume: VolumeLimit::UNITY,
            patterns: Vec::new(),
            filter_active: false,
            default_to_sink: false,
            notify: NotifyConfig::default(),
            pulse: PulseConfig::default(),
        }
    }
}

impl AdjustConfig {
    /// Parse and validate configuration text
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents, path)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load the file if it exists, defaults otherwise
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path).await
    }

    pub fn validate(&self) -> Result<()> {
        self.limit()?;
        if self.pulse.pactl.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("pulse.pactl must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn limit(&self) -> std::result::Result<VolumeLimit, VolumeParseError> {
        VolumeLimit::new(self.max_volume)
    }

    pub fn select_options(&self) -> SelectOptions {
        SelectOptions {
            filter_active: self.filter_active,
            default_fallback: self.default_to_sink,
        }
    }

    /// Default config file path
    ///
    /// Returns `~/.config/smart-volume-adjust/config.toml` on Linux
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("smart-volume-adjust").join("config.toml"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }
}
