//! Configuration presets for common analysis setups.
//!
//! Provides pre-built configurations for:
//! - Standard: 7-photon windows, 0.05-wide bins, 60-sample gate
//! - Fine: same windows, 0.025-wide bins for large datasets
//! - Coarse: 5-photon windows, 0.1-wide bins, 30-sample gate for small datasets
//! - Strict: standard, but out-of-range efficiencies abort the run

use crate::analysis::{AnalysisConfig, BinSpec, BoundaryPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// 7-photon windows, 0.05 bins, threshold 60
    Standard,
    /// 7-photon windows, 0.025 bins, threshold 60
    Fine,
    /// 5-photon windows, 0.1 bins, threshold 30
    Coarse,
    /// Standard parameters with the strict boundary policy
    Strict,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Standard,
        PresetName::Fine,
        PresetName::Coarse,
        PresetName::Strict,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Standard => "standard",
            PresetName::Fine => "fine",
            PresetName::Coarse => "coarse",
            PresetName::Strict => "strict",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "standard" | "default" => Some(PresetName::Standard),
            "fine" => Some(PresetName::Fine),
            "coarse" | "small" => Some(PresetName::Coarse),
            "strict" => Some(PresetName::Strict),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Standard => "7-photon sub-bursts, 0.05-wide E bins, 60-sample gate",
            PresetName::Fine => "7-photon sub-bursts, 0.025-wide E bins for large datasets",
            PresetName::Coarse => "5-photon sub-bursts, 0.1-wide E bins, 30-sample gate",
            PresetName::Strict => "Standard parameters; out-of-range efficiencies are errors",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                let valid: Vec<&str> = PresetName::ALL.iter().map(|p| p.as_str()).collect();
                write!(
                    f,
                    "unknown preset '{}'. Valid presets: {}",
                    name,
                    valid.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Information about a preset for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: String,
    pub window_size: usize,
    pub threshold: u64,
    pub num_bins: usize,
}

/// Get the configuration for a preset.
pub fn get_preset(name: PresetName) -> AnalysisConfig {
    match name {
        PresetName::Standard => AnalysisConfig::default(),
        PresetName::Fine => AnalysisConfig::default().with_bins(BinSpec::unit_interval(0.025)),
        PresetName::Coarse => AnalysisConfig::default()
            .with_window_size(5)
            .with_threshold(30)
            .with_bins(BinSpec::unit_interval(0.1)),
        PresetName::Strict => {
            AnalysisConfig::default().with_boundary_policy(BoundaryPolicy::Strict)
        }
    }
}

/// List all presets with their headline parameters.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| {
            let config = get_preset(name);
            let num_bins = config
                .bin_edges()
                .map(|edges| edges.len().saturating_sub(1))
                .unwrap_or(0);
            PresetInfo {
                name,
                description: name.description().to_string(),
                window_size: config.window_size,
                threshold: config.threshold,
                num_bins,
            }
        })
        .collect()
}
