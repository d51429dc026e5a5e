//! Error types for burst variance analysis.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation hints for humans
//!
//! Every error carries the context needed to locate the problem in the
//! input (burst id, row number, or the offending value).
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Malformed Burst
//!   Reason: malformed burst 17: expected photon 3, found 5
//!   Fix: Re-export the burst photon table; positions within a burst must be dense from 0.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 11,
//!   "category": "input",
//!   "message": "malformed burst 17: expected photon 3, found 5",
//!   "context": { "burst": 17 }
//! }
//! ```

use crate::photon::BurstId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for burst variance analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Photon table content errors.
    Input,
    /// Analysis parameter and config file errors.
    Config,
    /// Errors raised while binning or aggregating.
    Analysis,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for burst variance analysis.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("malformed burst {burst}: {reason}")]
    MalformedBurst { burst: BurstId, reason: String },

    #[error("missing required field `{field}` at row {row}")]
    MissingField { field: String, row: usize },

    #[error("unknown stream label {value:?} at row {row}")]
    UnknownStream { value: String, row: usize },

    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("invalid record at row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    // Configuration errors (20-29)
    #[error("invalid window size {0}: must be a positive integer")]
    InvalidWindowSize(usize),

    #[error("malformed bin edges: {0}")]
    MalformedBinEdges(String),

    #[error("configuration error: {0}")]
    Config(String),

    // Analysis errors (30-39)
    #[error(
        "raw efficiency {value} of burst {burst} is outside the bin range [{lower}, {upper}]"
    )]
    OutOfRangeEfficiency {
        burst: BurstId,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("internal error: {0}")]
    Internal(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Configuration errors
    /// - 30-39: Analysis errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MalformedBurst { .. } => 11,
            Error::MissingField { .. } => 12,
            Error::UnknownStream { .. } => 13,
            Error::Csv(_) => 14,
            Error::InvalidRow { .. } => 15,
            Error::InvalidWindowSize(_) => 20,
            Error::MalformedBinEdges(_) => 21,
            Error::Config(_) => 22,
            Error::OutOfRangeEfficiency { .. } => 30,
            Error::Internal(_) => 39,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedBurst { .. }
            | Error::MissingField { .. }
            | Error::UnknownStream { .. }
            | Error::Csv(_)
            | Error::InvalidRow { .. } => ErrorCategory::Input,

            Error::InvalidWindowSize(_) | Error::MalformedBinEdges(_) | Error::Config(_) => {
                ErrorCategory::Config
            }

            Error::OutOfRangeEfficiency { .. } | Error::Internal(_) => ErrorCategory::Analysis,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MalformedBurst { .. } => {
                "Re-export the burst photon table; positions within a burst must be dense from 0."
            }
            Error::MissingField { .. } => {
                "The photon table needs `burst`, `ph` and `stream` columns on every row."
            }
            Error::UnknownStream { .. } => {
                "Stream labels must be one of DexDem, DexAem, AexDem, AexAem."
            }
            Error::Csv(_) => "Check the CSV header and delimiter of the photon table.",
            Error::InvalidRow { .. } => "Each JSON Lines row must be one object with burst, ph and stream.",
            Error::InvalidWindowSize(_) => "Pass a window size of at least 1 photon.",
            Error::MalformedBinEdges(_) => {
                "Bin edges must be finite, strictly increasing, and at least two long."
            }
            Error::Config(_) => "Run 'bva config validate' to check the configuration file.",
            Error::OutOfRangeEfficiency { .. } => {
                "Widen the bin range, or use the 'exclude' or 'clamp' boundary policy."
            }
            Error::Internal(_) => "This is a bug; please report it with the input that triggered it.",
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check the file syntax.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MalformedBurst { .. } => "Malformed Burst",
            Error::MissingField { .. } => "Missing Field",
            Error::UnknownStream { .. } => "Unknown Stream Label",
            Error::Csv(_) => "CSV Parse Error",
            Error::InvalidRow { .. } => "Invalid Record",
            Error::InvalidWindowSize(_) => "Invalid Window Size",
            Error::MalformedBinEdges(_) => "Malformed Bin Edges",
            Error::Config(_) => "Configuration Error",
            Error::OutOfRangeEfficiency { .. } => "Efficiency Out Of Range",
            Error::Internal(_) => "Internal Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Additional structured context (burst id, row, value).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MalformedBurst { burst, .. } => {
                context.insert("burst".to_string(), serde_json::json!(burst));
            }
            Error::MissingField { field, row } => {
                context.insert("field".to_string(), serde_json::json!(field));
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::UnknownStream { value, row } => {
                context.insert("value".to_string(), serde_json::json!(value));
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::InvalidRow { row, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::InvalidWindowSize(n) => {
                context.insert("window_size".to_string(), serde_json::json!(n));
            }
            Error::OutOfRangeEfficiency {
                burst,
                value,
                lower,
                upper,
            } => {
                context.insert("burst".to_string(), serde_json::json!(burst));
                context.insert("value".to_string(), serde_json::json!(value));
                context.insert("lower".to_string(), serde_json::json!(lower));
                context.insert("upper".to_string(), serde_json::json!(upper));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
