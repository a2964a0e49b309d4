//! Configuration management for bottompin.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. `%APPDATA%/bottompin/config.toml` (Windows standard)
//! 2. `~/.config/bottompin/config.toml` (Unix-style, for WSL compatibility)
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use bottompin_core::{Geometry, PinOptions};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Lower bound for the poll interval; anything tighter is a busy loop.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Upper bound for the poll interval.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for bottompin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pinning behavior.
    pub pin: PinConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Pinning-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Delay between polls of the pinned window, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Whether to hide the window from the taskbar and Alt-Tab.
    #[serde(default = "default_true")]
    pub hide_from_task_switcher: bool,

    /// Target geometry. Omitted fields are left as the window has them.
    #[serde(default)]
    pub geometry: Geometry,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            hide_from_task_switcher: true,
            geometry: Geometry::unconstrained(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// The configured level, falling back to INFO for unknown values.
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

// Default value functions for serde
fn default_poll_interval_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A value that was out of range and has been corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Tries the following locations in order:
    /// 1. `%APPDATA%/bottompin/config.toml`
    /// 2. `~/.config/bottompin/config.toml`
    /// 3. `./config.toml`
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        let paths = config_paths();

        for path in &paths {
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp out-of-range values in place and report what was changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let interval = self.pin.poll_interval_ms;
        let clamped = interval.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        if clamped != interval {
            warnings.push(ConfigWarning {
                field: "pin.poll_interval_ms",
                message: format!(
                    "{} is outside [{}, {}], using {}",
                    interval, MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, clamped
                ),
            });
            self.pin.poll_interval_ms = clamped;
        }

        let level = self.logging.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.log_level",
                message: format!("unknown level {:?}, using \"info\"", self.logging.log_level),
            });
            self.logging.log_level = default_log_level();
        }

        let geometry = &mut self.pin.geometry;
        for (field, value) in [
            ("pin.geometry.width", &mut geometry.width),
            ("pin.geometry.height", &mut geometry.height),
        ] {
            if let Some(v) = value.filter(|v| *v <= 0) {
                warnings.push(ConfigWarning {
                    field,
                    message: format!("{} is not a positive size, leaving it unconstrained", v),
                });
                *value = None;
            }
        }

        warnings
    }

    /// Controller options derived from this configuration.
    pub fn pin_options(&self) -> PinOptions {
        PinOptions {
            poll_interval: Duration::from_millis(self.pin.poll_interval_ms),
            hide_from_task_switcher: self.pin.hide_from_task_switcher,
        }
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Windows standard: %APPDATA%/bottompin/config.toml
    if let Some(proj_dirs) = ProjectDirs::from("com", "bottompin", "bottompin") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. Unix-style: ~/.config/bottompin/config.toml
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("bottompin").join("config.toml"));
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pin.poll_interval_ms, 100);
        assert!(config.pin.hide_from_task_switcher);
        assert!(config.pin.geometry.is_unconstrained());
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.pin.geometry = Geometry::unconstrained().with_x(100).with_height(300);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pin.geometry, config.pin.geometry);
        assert_eq!(parsed.pin.poll_interval_ms, config.pin.poll_interval_ms);
    }

    #[test]
    fn test_config_partial_parse() {
        // Config with only some fields should use defaults for the rest
        let toml_str = r#"
            [pin]
            poll_interval_ms = 250

            [pin.geometry]
            x = 0
            y = 0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pin.poll_interval_ms, 250);
        assert!(config.pin.hide_from_task_switcher); // default
        assert_eq!(config.pin.geometry.x, Some(0));
        assert_eq!(config.pin.geometry.width, None);
        assert_eq!(config.logging.log_level, "info"); // default
    }

    #[test]
    fn test_config_paths_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths.last(), Some(&PathBuf::from("config.toml")));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = Config::load_from_path(Path::new("definitely/not/here/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_clamps_poll_interval() {
        let mut config = Config::default();
        config.pin.poll_interval_ms = 0;
        let warnings = config.validate();
        assert_eq!(config.pin.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "pin.poll_interval_ms");

        config.pin.poll_interval_ms = 10 * MAX_POLL_INTERVAL_MS;
        config.validate();
        assert_eq!(config.pin.poll_interval_ms, MAX_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_validate_unknown_log_level() {
        let mut config = Config::default();
        config.logging.log_level = "chatty".to_string();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.logging.level(), Level::INFO);
    }

    #[test]
    fn test_validate_drops_non_positive_sizes() {
        let mut config = Config::default();
        config.pin.geometry = Geometry::unconstrained().with_x(-1920).with_width(0).with_height(600);
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "pin.geometry.width");
        // Negative positions are legal on multi-monitor setups.
        assert_eq!(config.pin.geometry.x, Some(-1920));
        assert_eq!(config.pin.geometry.width, None);
        assert_eq!(config.pin.geometry.height, Some(600));
    }

    #[test]
    fn test_validate_drops_both_sizes() {
        let mut config = Config::default();
        config.pin.geometry = Geometry::unconstrained().with_width(-5).with_height(0);
        let warnings = config.validate();
        let fields: Vec<_> = warnings.iter().map(|w| w.field).collect();
        assert_eq!(fields, vec!["pin.geometry.width", "pin.geometry.height"]);
        assert!(config.pin.geometry.is_unconstrained());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let logging = LoggingConfig {
            log_level: "DEBUG".to_string(),
        };
        assert_eq!(logging.level(), Level::DEBUG);
    }

    #[test]
    fn test_pin_options_from_config() {
        let mut config = Config::default();
        config.pin.poll_interval_ms = 250;
        config.pin.hide_from_task_switcher = false;
        let options = config.pin_options();
        assert_eq!(options.poll_interval, Duration::from_millis(250));
        assert!(!options.hide_from_task_switcher);
    }
}
