//! Strict error handling with CommandError enum
//!
//! All errors are serializable for IPC communication with the popup frontend.

use serde::Serialize;
use thiserror::Error;

/// Command execution errors
///
/// This enum provides strict error handling for all command operations.
/// All variants are serializable for IPC communication with the frontend.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    /// System I/O error (file operations, subprocess spawning, etc.)
    #[error("System I/O error: {0}")]
    SystemIO(String),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network/API error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Required feature is missing or unavailable
    #[error("{0}")]
    FeatureMissing(String),
}

// Implement From for common error types
impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::SystemIO(err.to_string())
    }
}

impl From<reqwest::Error> for CommandError {
    fn from(err: reqwest::Error) -> Self {
        CommandError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::InvalidInput(format!("JSON error: {}", err))
    }
}

// Helper type alias for command results
pub type CommandResult<T> = Result<T, CommandError>;
