//! TOML-based configuration for the translation helpers.
//!
//! Reads `HelperConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\uiohook\config.toml`
//! - Linux:    `~/.config/uiohook/config.toml` (honours `XDG_CONFIG_HOME`)
//! - macOS:    `~/Library/Application Support/uiohook/config.toml`
//!
//! Example:
//!
//! ```toml
//! [timestamps]
//! source = "epoch"
//!
//! [input_method]
//! locale_modifiers = ["", "@im=none"]
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "...")]`, so a missing file, a
//! missing section and a missing key all fall back to the built-in values.
//! The helpers behave exactly as they would with no configuration at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uiohook_core::TimestampSource;

use crate::application::record::{RecordOptions, DEFAULT_LOCALE_MODIFIERS};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level helper configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HelperConfig {
    #[serde(default)]
    pub timestamps: TimestampConfig,
    #[serde(default)]
    pub input_method: InputMethodConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Clock used to stamp RECORD events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimestampConfig {
    /// `"server"` (X server milliseconds) or `"epoch"` (wall clock).
    #[serde(default)]
    pub source: TimestampSource,
}

/// X input method settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputMethodConfig {
    /// Locale modifier strings tried in order when opening an input method.
    #[serde(default = "default_locale_modifiers")]
    pub locale_modifiers: Vec<String>,
}

/// Logging settings.  `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_locale_modifiers() -> Vec<String> {
    DEFAULT_LOCALE_MODIFIERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            source: TimestampSource::Server,
        }
    }
}

impl Default for InputMethodConfig {
    fn default() -> Self {
        Self {
            locale_modifiers: default_locale_modifiers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl HelperConfig {
    /// Options for the RECORD helper.
    pub fn record_options(&self) -> RecordOptions {
        RecordOptions {
            timestamps: self.timestamps.source,
            locale_modifiers: self.input_method.locale_modifiers.clone(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `HelperConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<HelperConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `HelperConfig` from `path`, returning `HelperConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<HelperConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: HelperConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(HelperConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &HelperConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory, `uiohook` subdirectory included.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("uiohook"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("uiohook"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("uiohook")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
