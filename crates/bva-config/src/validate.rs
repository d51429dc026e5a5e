//! Configuration validation errors and semantic validation.

use crate::analysis::AnalysisConfig;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("window size must be a positive integer, got {0}")]
    InvalidWindowSize(usize),

    #[error("malformed bin edges: {0}")]
    MalformedBinEdges(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::InvalidWindowSize(_) => 20,
            ValidationError::MalformedBinEdges(_) => 21,
            ValidationError::VersionMismatch { .. } => 24,
        }
    }
}

impl From<ValidationError> for bva_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidWindowSize(n) => bva_common::Error::InvalidWindowSize(n),
            ValidationError::MalformedBinEdges(msg) => bva_common::Error::MalformedBinEdges(msg),
            other => bva_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate an analysis config semantically.
///
/// Returns the materialized bin edges on success so callers do not have to
/// regenerate them.
pub fn validate_config(config: &AnalysisConfig) -> ValidationResult<Vec<f64>> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_window_size(config.window_size)?;

    let edges = config.bin_edges()?;
    validate_bin_edges(&edges)?;
    Ok(edges)
}

/// Window size must be at least one photon.
pub fn validate_window_size(window_size: usize) -> ValidationResult<()> {
    if window_size == 0 {
        return Err(ValidationError::InvalidWindowSize(window_size));
    }
    Ok(())
}

/// Edges must be finite, strictly increasing, and at least two long.
pub fn validate_bin_edges(edges: &[f64]) -> ValidationResult<()> {
    if edges.len() < 2 {
        return Err(ValidationError::MalformedBinEdges(format!(
            "need at least 2 edges, got {}",
            edges.len()
        )));
    }

    if let Some((i, e)) = edges.iter().enumerate().find(|(_, e)| !e.is_finite()) {
        return Err(ValidationError::MalformedBinEdges(format!(
            "edge {} is not finite ({})",
            i, e
        )));
    }

    for (i, pair) in edges.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(ValidationError::MalformedBinEdges(format!(
                "edges must be strictly increasing: edges[{}]={} >= edges[{}]={}",
                i,
                pair[0],
                i + 1,
                pair[1]
            )));
        }
    }

    Ok(())
}

/// Describe how the edges fail to cover the efficiency domain `[0, 1]`.
///
/// Not an error: bursts outside the covered range are handled by the
/// boundary policy. Returns None when `[0, 1]` is fully covered.
pub fn coverage_gap(edges: &[f64]) -> Option<String> {
    let (first, last) = match (edges.first(), edges.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Some("no bin edges".to_string()),
    };
    match (first > 0.0, last < 1.0) {
        (false, false) => None,
        (true, false) => Some(format!("efficiencies below {} are not covered", first)),
        (false, true) => Some(format!("efficiencies above {} are not covered", last)),
        (true, true) => Some(format!(
            "efficiencies outside [{}, {}] are not covered",
            first, last
        )),
    }
}
