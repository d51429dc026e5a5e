//! Typed analysis configuration.
//!
//! A config file is a single JSON object; every field is optional and falls
//! back to the defaults below.
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "window_size": 7,
//!   "threshold": 60,
//!   "bins": { "kind": "range", "start": 0.0, "stop": 1.01, "step": 0.05 },
//!   "boundary_policy": "exclude",
//!   "acceptor": "DexAem"
//! }
//! ```

use crate::resolve::ConfigError;
use crate::validate::{ValidationError, ValidationResult};
use bva_common::StreamLabel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default number of photons per sub-burst window.
pub const DEFAULT_WINDOW_SIZE: usize = 7;

/// Default minimum pooled sample count for a bin to be reported.
pub const DEFAULT_THRESHOLD: u64 = 60;

/// Upper bound on generated bin edges, guards against tiny steps.
pub const MAX_BIN_EDGES: usize = 100_000;

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_threshold() -> u64 {
    DEFAULT_THRESHOLD
}

/// Burst variance analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Photons per sub-burst window (`n`).
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// A bin reports a value only when its sample count exceeds this.
    #[serde(default = "default_threshold")]
    pub threshold: u64,

    /// Raw-efficiency binning.
    #[serde(default)]
    pub bins: BinSpec,

    /// What to do with bursts whose raw efficiency falls outside the bins.
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,

    /// Stream counted in the numerator of the efficiency ratio.
    #[serde(default)]
    pub acceptor: StreamLabel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            schema_version: default_schema_version(),
            window_size: DEFAULT_WINDOW_SIZE,
            threshold: DEFAULT_THRESHOLD,
            bins: BinSpec::default(),
            boundary_policy: BoundaryPolicy::default(),
            acceptor: StreamLabel::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a config from a JSON string (no semantic validation).
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Read and parse a config file (no semantic validation).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Materialized bin edges.
    pub fn bin_edges(&self) -> ValidationResult<Vec<f64>> {
        self.bins.edges()
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_bins(mut self, bins: BinSpec) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }
}

/// How the efficiency bin edges are specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinSpec {
    /// Evenly spaced edges `start + k*step` for every k with the edge below `stop`.
    Range { start: f64, stop: f64, step: f64 },
    /// Explicit edges.
    Edges { edges: Vec<f64> },
}

impl Default for BinSpec {
    /// 0.05-wide bins with edges 0.00, 0.05, ..., 1.00.
    fn default() -> Self {
        BinSpec::Range {
            start: 0.0,
            stop: 1.01,
            step: 0.05,
        }
    }
}

impl BinSpec {
    /// Evenly spaced bins of `width` covering `[0, 1]`.
    pub fn unit_interval(width: f64) -> Self {
        BinSpec::Range {
            start: 0.0,
            stop: 1.0 + width / 5.0,
            step: width,
        }
    }

    /// Materialize the edge sequence.
    ///
    /// Only the range form is checked here (step sign, finiteness, edge
    /// count); ordering of explicit edges is checked by validation.
    pub fn edges(&self) -> ValidationResult<Vec<f64>> {
        match self {
            BinSpec::Edges { edges } => Ok(edges.clone()),
            BinSpec::Range { start, stop, step } => {
                if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
                    return Err(ValidationError::MalformedBinEdges(format!(
                        "range start/stop/step must be finite, got {}/{}/{}",
                        start, stop, step
                    )));
                }
                if *step <= 0.0 {
                    return Err(ValidationError::MalformedBinEdges(format!(
                        "range step must be positive, got {}",
                        step
                    )));
                }
                let span = (stop - start) / step;
                if span > MAX_BIN_EDGES as f64 {
                    return Err(ValidationError::MalformedBinEdges(format!(
                        "range produces more than {} edges",
                        MAX_BIN_EDGES
                    )));
                }
                let count = span.ceil().max(0.0) as usize;
                Ok((0..count).map(|k| start + k as f64 * step).collect())
            }
        }
    }
}

/// Policy for bursts whose raw efficiency falls outside `[edges[0], edges[B]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Leave the burst out of binning; it is still reported per burst.
    #[default]
    Exclude,
    /// Assign the burst to the first or last bin.
    Clamp,
    /// Abort the analysis with an out-of-range error.
    Strict,
}

impl BoundaryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::Exclude => "exclude",
            BoundaryPolicy::Clamp => "clamp",
            BoundaryPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" | "reject" | "drop" => Ok(BoundaryPolicy::Exclude),
            "clamp" => Ok(BoundaryPolicy::Clamp),
            "strict" | "error" => Ok(BoundaryPolicy::Strict),
            _ => Err(format!("unknown boundary policy: {}", s)),
        }
    }
}
