//! Unified error type hierarchy for the EXE builder
//!
//! Provides structured error handling with ConfigError, BuildError and AppError.

use std::io;
use thiserror::Error;

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Packaging step errors.
///
/// The only failure the orchestrator recovers from locally. Everything else
/// travels as [`AppError`] up to the top-level handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Packager ran and exited with a non-zero status (`None` when killed by a signal)
    #[error("Command '{cmd}' returned non-zero exit status {}{}", fmt_code(.code), fmt_detail(.detail))]
    PackagingFailed {
        cmd: String,
        code: Option<i32>,
        detail: String,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

fn fmt_detail(detail: &str) -> String {
    if detail.trim().is_empty() {
        ".".to_string()
    } else {
        format!(":\n{}", detail.trim_end())
    }
}

/// Global error type for everything outside the packaging step.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// OS command could not be launched (e.g., python, pyinstaller missing from PATH)
    #[error("Command '{cmd}' failed: {reason}")]
    OsCommand { cmd: String, reason: String },

    /// File I/O error (read/write/delete)
    #[error("I/O error: {0}")]
    Io(String),

    /// Build configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Log pipeline setup failed
    #[error("Logging error: {0}")]
    Logging(String),

    /// Stage entered out of order
    #[error("Orchestration error: {0}")]
    Orchestration(String),
}

impl AppError {
    /// Get a user-facing error message suitable for console display
    pub fn user_message(&self) -> String {
        match self {
            AppError::OsCommand { cmd, reason } => {
                format!("Failed to execute '{}': {}", cmd, reason)
            }
            AppError::Io(msg) => format!("File operation failed: {}", msg),
            AppError::Config(msg) => format!("Build configuration error: {}", msg),
            AppError::Logging(msg) => format!("Could not set up logging: {}", msg),
            AppError::Orchestration(msg) => format!("Build sequence error: {}", msg),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
