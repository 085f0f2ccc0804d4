//! Configuration management for Keystroke Overlay
//!
//! Configuration is read from a TOML file in the platform config directory.
//! Missing sections or fields fall back to defaults.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keystroke-overlay/config.toml` |
//! | macOS | `~/Library/Application Support/keystroke-overlay/config.toml` |
//! | Windows | `%APPDATA%\keystroke-overlay\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keystroke_overlay::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.aggregation.show_history = true;
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value is out of its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("keystroke-overlay");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Grouping and eviction settings
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Periodic sweep settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Settings consumed by the aggregation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// How long a released key stays visible
    pub linger_duration_ms: u64,
    /// Keep a trail of past groups instead of only the live one
    pub show_history: bool,
    /// Upper bound on retained groups in history mode
    pub max_groups: usize,
    /// Pointer travel (px) with a button held before it counts as a drag
    pub drag_threshold_px: f64,
    /// How long after the last wheel event scrolling is considered over
    pub scroll_linger_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            linger_duration_ms: 3000,
            show_history: false,
            max_groups: 5,
            drag_threshold_px: 8.0,
            scroll_linger_ms: 500,
        }
    }
}

impl AggregationConfig {
    /// Check that every bound is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_groups == 0 {
            return Err(ConfigError::Invalid {
                field: "max_groups",
                reason: "must be at least 1",
            });
        }
        if self.linger_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "linger_duration_ms",
                reason: "must be greater than zero",
            });
        }
        if self.scroll_linger_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "scroll_linger_ms",
                reason: "must be greater than zero",
            });
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(ConfigError::Invalid {
                field: "drag_threshold_px",
                reason: "must be a finite, non-negative number",
            });
        }
        Ok(())
    }

    pub fn linger_duration(&self) -> Duration {
        Duration::from_millis(self.linger_duration_ms)
    }

    pub fn scroll_linger(&self) -> Duration {
        Duration::from_millis(self.scroll_linger_ms)
    }
}

/// Periodic sweep configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between eviction sweeps
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// out-of-range values.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregation.validate()?;
        self.scheduler.validate()
    }
}
