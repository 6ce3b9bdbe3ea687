//! Error hierarchy for the I/O-facing parts of FlareWatch
//!
//! The analysis engine itself never fails; these errors come from reading
//! journal exports and configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum FlareWatchError {
    /// Journal import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors while reading a journal export
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// Row number is 1-based and counts the header
    #[error("Invalid date on row {row}: {value}")]
    InvalidDate { row: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for FlareWatch operations
pub type Result<T> = std::result::Result<T, FlareWatchError>;

impl FlareWatchError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FlareWatchError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            FlareWatchError::Import(ImportError::InvalidDate { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FlareWatchError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find journal file: {}", path.display())
            }
            FlareWatchError::Import(ImportError::MissingColumn { column }) => {
                format!(
                    "The journal export has no '{}' column. Is this a symptom journal CSV?",
                    column
                )
            }
            FlareWatchError::Import(ImportError::InvalidDate { row, value }) => {
                format!(
                    "Row {} has a date '{}' that is not in YYYY-MM-DD form",
                    row, value
                )
            }
            FlareWatchError::Import(ImportError::UnsupportedFormat { format }) => {
                format!("Cannot read '{}' files; use a .csv or .json export", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the command from completing
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
