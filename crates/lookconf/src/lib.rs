//! Configuration loading for Lookback.
//!
//! Three sections:
//!
//! - `[backend]` - where the archive backend lives and how long we wait
//!   for it.
//! - `[playback]` - knobs that seed a fresh playback session. After that
//!   the session itself is the source of truth.
//! - `[telemetry]` - logging.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/lookback/config.toml` (system)
//! 2. `~/.config/lookback/config.toml` (user)
//! 3. `./lookback.toml` (local override)
//! 4. Environment variables (`LOOKBACK_*`)
//!
//! # Example Config
//!
//! ```toml
//! [backend]
//! base_url = "http://archive.lan:5001"
//!
//! [playback]
//! quiet_period_ms = 500
//! start_rewind_mins = 60
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;

pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete Lookback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LookConfig {
    pub backend: BackendConfig,
    pub playback: PlaybackConfig,
    pub telemetry: TelemetryConfig,
}

/// Where the archive backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the archive backend.
    pub base_url: String,
    /// Connect timeout for stream requests, in seconds. The stream itself
    /// has no overall deadline - it lives until released.
    pub connect_timeout_secs: u64,
    /// Timeout for the advisory stop notification, in seconds.
    pub stop_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            connect_timeout_secs: 10,
            stop_timeout_secs: 5,
        }
    }
}

/// Seeds for a fresh playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Quiet period for collapsing bursts of scrub and rate changes, in
    /// milliseconds.
    pub quiet_period_ms: u64,
    /// Rate a fresh session starts at (must be one of 0.5, 1, 2, 4).
    pub default_rate: f64,
    /// How far behind "now" a fresh session points, in minutes.
    pub start_rewind_mins: i64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 500,
            default_rate: 1.0,
            start_rewind_mins: 60,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default log filter; `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl LookConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/lookback/config.toml`
    /// 3. `~/.config/lookback/config.toml`
    /// 4. `./lookback.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env
    /// overrides. If `config_path` is provided it takes precedence over
    /// the local `./lookback.toml` override; system and user configs
    /// still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and return information about sources.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Load configuration from an optional path and return information
    /// about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = LookConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize the effective config to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
