//! Burst variance analysis configuration loading and validation.
//!
//! This crate provides:
//! - The typed analysis config (window size, threshold, bins, boundary policy)
//! - Built-in presets
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod analysis;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use analysis::{AnalysisConfig, BinSpec, BoundaryPolicy};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{load_config, resolve_config_path, ConfigError, ConfigSource, LoadedConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = bva_common::SCHEMA_VERSION;
