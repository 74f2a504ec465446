//! Configuration management for autotap

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{GesturePoint, TapConfig};

/// Largest accepted tap interval (10 minutes). The engine itself does
/// not enforce this; the bound lives here with the rest of the user
/// input validation.
pub const MAX_INTERVAL_MS: u64 = 600_000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Quick-tap pattern configuration
    #[serde(default)]
    pub quick_tap: QuickTapConfig,

    /// Recording replay configuration
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Path to config file (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickTapConfig {
    /// Points to tap, in replay order
    #[serde(default)]
    pub points: Vec<GesturePoint>,

    /// Pause between taps in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Whether `play` repeats the recording until cancelled
    #[serde(default)]
    pub loop_recording: bool,
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for QuickTapConfig {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            loop_recording: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quick_tap: QuickTapConfig::default(),
            playback: PlaybackConfig::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from default location or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let mut config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            config.validate()?;
            config.config_path = Some(config_path);
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = match &self.config_path {
            Some(path) => path.clone(),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_config_path(),
        }
    }

    /// Get default config path
    fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("dev", "autotap", "autotap")
            .context("Failed to determine config directory")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Reject values the engine would otherwise happily run with
    pub fn validate(&self) -> Result<()> {
        if self.quick_tap.interval_ms < 1 || self.quick_tap.interval_ms > MAX_INTERVAL_MS {
            bail!(
                "quick_tap.interval_ms must be between 1 and {}, got {}",
                MAX_INTERVAL_MS,
                self.quick_tap.interval_ms
            );
        }
        Ok(())
    }

    /// The quick-tap pattern as an engine task config
    pub fn tap_config(&self) -> TapConfig {
        TapConfig {
            points: self.quick_tap.points.clone(),
            interval_ms: self.quick_tap.interval_ms,
        }
    }
}
