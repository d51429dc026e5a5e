//! Exit codes for the bva CLI.
//!
//! Ranges:
//! - 0: success
//! - 10-19: user errors (arguments, config, input data, analysis domain)
//! - 20-29: internal and I/O errors

use bva_common::{Error, ErrorCategory};

/// Process exit codes. Stable for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    /// Invalid arguments or configuration.
    ArgsError = 10,

    /// Photon table could not be parsed or is inconsistent.
    InputError = 11,

    /// Analysis aborted (e.g. out-of-range efficiency under `strict`).
    AnalysisError = 12,

    /// Internal error (bug).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// User-recoverable error (10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    /// Internal or I/O error (20-29).
    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 20
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::AnalysisError => "ERR_ANALYSIS",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Map an error to the exit code the CLI reports for it.
    pub fn from_error(err: &Error) -> ExitCode {
        match err {
            Error::Internal(_) => ExitCode::InternalError,
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ArgsError,
                ErrorCategory::Input => ExitCode::InputError,
                ErrorCategory::Analysis => ExitCode::AnalysisError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
