//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - at least one result
//! - `1`: General error - unspecified failure
//! - `2`: Blocking error - critical failure that should halt automation
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::SearchError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Critical error that should halt automation (code 2)
    BlockingError = 2,

    /// Query ran but matched nothing (code 3)
    NotFound = 3,

    /// A shard or manifest could not be parsed (code 4)
    ParseError = 4,

    /// Shard could not be read (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` when a search produced results, `NotFound` otherwise.
    pub fn from_result_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Success
        } else {
            ExitCode::NotFound
        }
    }

    /// Convert a `SearchError` to the appropriate exit code.
    pub fn from_error(error: &SearchError) -> Self {
        match error {
            SearchError::ShardParse { .. } | SearchError::ManifestParse { .. } => {
                ExitCode::ParseError
            }
            SearchError::ShardFetch { .. } => ExitCode::IoError,
            SearchError::UnknownShard { .. } => ExitCode::NotFound,
            SearchError::ConfigError { .. } => ExitCode::ConfigError,
            SearchError::General(_) => ExitCode::GeneralError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::BlockingError => "Blocking error - automation should halt",
            ExitCode::NotFound => "Not found",
            ExitCode::ParseError => "Parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
        }
    }
}
