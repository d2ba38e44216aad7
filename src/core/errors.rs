//! Error types for the cq library.
//!
//! Every recoverable failure mode described by the error-handling design
//! (parse failure, analyzer degradation, config failure, validation
//! failure, per-file I/O failure) has an explicit result value here rather
//! than a panic or an exception-shaped control path.

use std::fmt;
use std::io;

use thiserror::Error;

/// Main result type for cq operations.
pub type Result<T> = std::result::Result<T, CqError>;

/// Comprehensive error type for all cq operations.
#[derive(Error, Debug)]
pub enum CqError {
    /// I/O related errors (file operations, process spawn, etc.)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors. Fatal: a scan aborts before any analysis.
    #[error("configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error, if known
        field: Option<String>,
    },

    /// Parsing errors. Never fatal — `ast_service::parse` reports failure
    /// as a return value, this variant exists for adapters that must
    /// surface a parse problem through a `Result`-returning API.
    #[error("parse error: {message}")]
    Parse {
        /// Error description
        message: String,
        /// File path where the error occurred, if known
        file_path: Option<String>,
    },

    /// Analysis pipeline errors.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where the error occurred
        stage: String,
        /// Error description
        message: String,
    },

    /// Report-schema validation errors. Non-fatal: the report is still
    /// written and this accompanies exit code 2.
    #[error("validation error: {message}")]
    Validation {
        /// Error description
        message: String,
    },

    /// Generic internal errors.
    #[error("internal error: {message}")]
    Internal {
        /// Error description
        message: String,
    },
}

impl CqError {
    /// Create a new I/O error with context.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context.
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: None,
        }
    }

    /// Create a new parse error with file context.
    pub fn parse_at(message: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: Some(file_path.into()),
        }
    }

    /// Create a new pipeline error.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<io::Error> for CqError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for CqError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<serde_yaml::Error> for CqError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config {
            message: format!("YAML error: {err}"),
            field: None,
        }
    }
}

/// Result extension trait for adding stage context to errors.
pub trait ResultExt<T> {
    /// Wrap an error in a pipeline error tagged with the given stage.
    fn stage(self, stage: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn stage(self, stage: &str) -> Result<T> {
        self.map_err(|e| CqError::pipeline(stage, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_field() {
        let err = CqError::config_field("bad weight", "weights.metrics.lint");
        match err {
            CqError::Config { field, .. } => assert_eq!(field.as_deref(), Some("weights.metrics.lint")),
            _ => panic!("expected Config variant"),
        }
    }

    #[test]
    fn stage_wraps_display_errors() {
        let result: std::result::Result<(), String> = Err("boom".to_string());
        let wrapped = result.stage("duplication");
        assert!(matches!(wrapped, Err(CqError::Pipeline { .. })));
    }
}
