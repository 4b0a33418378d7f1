//! Result and error types for covreport.

use thiserror::Error;

/// Result type for covreport operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while loading data or writing reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input that cannot be interpreted at all
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message
        message: String,
    },

    /// Unknown text encoding label
    #[error("Unknown encoding label: {label}")]
    Encoding {
        /// Label that was requested
        label: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ReportError {
    /// Create an invalid-input error
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
