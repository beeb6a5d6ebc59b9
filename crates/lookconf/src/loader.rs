//! Config file discovery, loading, and environment variable overlay.

use crate::{BackendConfig, ConfigError, LookConfig, PlaybackConfig, TelemetryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/lookback/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("lookback/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    // Local override (current directory)
    let local = PathBuf::from("lookback.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<LookConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge two configs, with `overlay` taking precedence.
///
/// A field wins only when the overlay actually set it to something other
/// than the compiled default, so partial files keep earlier values intact.
pub fn merge_configs(base: LookConfig, overlay: LookConfig) -> LookConfig {
    fn pick<T: PartialEq>(overlay: T, base: T, default: T) -> T {
        if overlay != default {
            overlay
        } else {
            base
        }
    }

    let d = LookConfig::default();
    LookConfig {
        backend: BackendConfig {
            base_url: pick(
                overlay.backend.base_url,
                base.backend.base_url,
                d.backend.base_url,
            ),
            connect_timeout_secs: pick(
                overlay.backend.connect_timeout_secs,
                base.backend.connect_timeout_secs,
                d.backend.connect_timeout_secs,
            ),
            stop_timeout_secs: pick(
                overlay.backend.stop_timeout_secs,
                base.backend.stop_timeout_secs,
                d.backend.stop_timeout_secs,
            ),
        },
        playback: PlaybackConfig {
            quiet_period_ms: pick(
                overlay.playback.quiet_period_ms,
                base.playback.quiet_period_ms,
                d.playback.quiet_period_ms,
            ),
            default_rate: pick(
                overlay.playback.default_rate,
                base.playback.default_rate,
                d.playback.default_rate,
            ),
            start_rewind_mins: pick(
                overlay.playback.start_rewind_mins,
                base.playback.start_rewind_mins,
                d.playback.start_rewind_mins,
            ),
        },
        telemetry: TelemetryConfig {
            log_level: pick(
                overlay.telemetry.log_level,
                base.telemetry.log_level,
                d.telemetry.log_level,
            ),
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut LookConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("LOOKBACK_BASE_URL") {
        config.backend.base_url = v;
        sources.env_overrides.push("LOOKBACK_BASE_URL".to_string());
    }
    if let Ok(v) = env::var("LOOKBACK_QUIET_PERIOD_MS") {
        if let Ok(ms) = v.parse() {
            config.playback.quiet_period_ms = ms;
            sources
                .env_overrides
                .push("LOOKBACK_QUIET_PERIOD_MS".to_string());
        }
    }
    if let Ok(v) = env::var("LOOKBACK_DEFAULT_RATE") {
        if let Ok(rate) = v.parse() {
            config.playback.default_rate = rate;
            sources
                .env_overrides
                .push("LOOKBACK_DEFAULT_RATE".to_string());
        }
    }
    if let Ok(v) = env::var("LOOKBACK_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("LOOKBACK_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}
