//! Error taxonomy shared by the harness, the generation cache and their callers.
//!
//! Every variant maps onto one stable [`ErrorKind`], which is what the HTTP
//! layer and the CLI report to users.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JudgeError {
    #[error("Execution backend error: {0}")]
    ExecutionBackend(String),
    #[error("Execution timed out after {}s", .0.as_secs_f64())]
    ExecutionTimeout(Duration),
    #[error("Generation backend unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("Generation timed out after {}s", .0.as_secs_f64())]
    GenerationTimeout(Duration),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Stable error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BackendUnavailable,
    BackendTimeout,
    ConfigError,
    ValidationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BackendUnavailable => "BackendUnavailable",
            ErrorKind::BackendTimeout => "BackendTimeout",
            ErrorKind::ConfigError => "ConfigError",
            ErrorKind::ValidationError => "ValidationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JudgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JudgeError::ExecutionBackend(_) | JudgeError::GenerationUnavailable(_) => {
                ErrorKind::BackendUnavailable
            }
            JudgeError::ExecutionTimeout(_) | JudgeError::GenerationTimeout(_) => {
                ErrorKind::BackendTimeout
            }
            JudgeError::Config(_) => ErrorKind::ConfigError,
            JudgeError::Validation(_) => ErrorKind::ValidationError,
        }
    }
}

pub type Result<T> = std::result::Result<T, JudgeError>;
