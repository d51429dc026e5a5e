//! Configuration resolution and loading.
//!
//! Resolution order: preset → CLI path → environment variables → XDG → defaults.

use crate::analysis::AnalysisConfig;
use crate::preset::{get_preset, PresetName};
use crate::validate::{validate_config, ValidationError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "BVA_CONFIG";
pub const ENV_CONFIG_DIR: &str = "BVA_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "bva.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bva";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl From<ConfigError> for bva_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(v) => v.into(),
            ConfigError::IoError { source, .. } => bva_common::Error::Io(source),
            other => bva_common::Error::Config(other.to_string()),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// A named built-in preset.
    Preset(PresetName),

    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Preset(name) => write!(f, "preset '{}'", name),
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A loaded, validated configuration with provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    /// File the config was read from (None for presets and defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve the config file path.
///
/// Resolution order:
/// 1. Explicit CLI path (must exist)
/// 2. `BVA_CONFIG` environment variable (direct path)
/// 3. `BVA_CONFIG_DIR` environment variable + `bva.json`
/// 4. XDG config directory (`~/.config/bva/bva.json`)
/// 5. Built-in defaults (None)
pub fn resolve_config_path(
    cli_path: Option<&Path>,
) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok((Some(path.to_path_buf()), ConfigSource::CliArgument));
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
        tracing::warn!(path = %path.display(), "{} points to a missing file", ENV_CONFIG_PATH);
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    // 5. Built-in default
    Ok((None, ConfigSource::BuiltinDefault))
}

/// Load and validate the configuration.
///
/// A preset takes precedence over any config file.
pub fn load_config(
    cli_path: Option<&Path>,
    preset: Option<PresetName>,
) -> Result<LoadedConfig, ConfigError> {
    let loaded = if let Some(name) = preset {
        LoadedConfig {
            config: get_preset(name),
            path: None,
            source: ConfigSource::Preset(name),
        }
    } else {
        let (path, source) = resolve_config_path(cli_path)?;
        let config = match &path {
            Some(p) => AnalysisConfig::from_file(p)?,
            None => AnalysisConfig::default(),
        };
        LoadedConfig {
            config,
            path,
            source,
        }
    };

    validate_config(&loaded.config)?;
    tracing::debug!(source = %loaded.source, "configuration loaded");
    Ok(loaded)
}

/// Get the XDG config directory for bva.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
