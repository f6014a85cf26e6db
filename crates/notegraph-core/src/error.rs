//! Error types and exit codes for notegraph
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (missing note, invalid config)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the notegraph CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing note, invalid config (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during notegraph operations
#[derive(Error, Debug)]
pub enum NotegraphError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("unknown completion context: {0} (expected: wiki, markdown, or tag)")]
    UnknownContext(String),

    #[error("{0}")]
    UsageError(String),

    // Data errors (exit code 3)
    #[error("note not found: {name}")]
    NoteNotFound { name: String },

    #[error("invalid config in {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl NotegraphError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            NotegraphError::UnknownFormat(_)
            | NotegraphError::UnknownContext(_)
            | NotegraphError::UsageError(_) => ExitCode::Usage,

            NotegraphError::NoteNotFound { .. } | NotegraphError::InvalidConfig { .. } => {
                ExitCode::Data
            }

            NotegraphError::Io(_) | NotegraphError::Json(_) | NotegraphError::Other(_) => {
                ExitCode::Failure
            }
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            NotegraphError::UnknownFormat(_) => "unknown_format",
            NotegraphError::UnknownContext(_) => "unknown_context",
            NotegraphError::UsageError(_) => "usage_error",
            NotegraphError::NoteNotFound { .. } => "note_not_found",
            NotegraphError::InvalidConfig { .. } => "invalid_config",
            NotegraphError::Io(_) => "io_error",
            NotegraphError::Json(_) => "json_error",
            NotegraphError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for notegraph operations
pub type Result<T> = std::result::Result<T, NotegraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_code_2() {
        assert_eq!(
            NotegraphError::UnknownFormat("yaml".into()).exit_code(),
            ExitCode::Usage
        );
        assert_eq!(
            NotegraphError::UnknownContext("link".into()).exit_code(),
            ExitCode::Usage
        );
    }

    #[test]
    fn test_data_errors_exit_code_3() {
        assert_eq!(
            NotegraphError::NoteNotFound {
                name: "missing".into()
            }
            .exit_code(),
            ExitCode::Data
        );
    }

    #[test]
    fn test_to_json_envelope() {
        let err = NotegraphError::NoteNotFound {
            name: "orphan".into(),
        };
        let json = err.to_json();
        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["type"], "note_not_found");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("orphan"));
    }
}
