//! Fatal error handling for reelcut
//!
//! Anything represented here stops the whole run before per-file work
//! starts. Per-file and per-job failures use `DomainError` instead.

use thiserror::Error;

/// Setup errors that terminate a run
#[derive(Error, Debug)]
pub enum ReelcutError {
    /// Neither `--config` nor piped standard input was available
    #[error("No configuration provided. Use --config <file> or pipe JSON to stdin.")]
    MissingInput,

    /// The `--config` file could not be read
    #[error("Failed to read config file {path}: {message}")]
    ConfigFile { path: String, message: String },

    /// Input parsed but failed validation
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Settings file could not be read or parsed
    #[error("Invalid settings file {path}: {message}")]
    Settings { path: String, message: String },

    /// Every listed file was missing
    #[error("No valid files to process")]
    NoValidFiles,

    /// The configured encoding tool could not be found
    #[error("Encoding tool not found: {path}")]
    ToolNotFound { path: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input JSON could not be parsed into the operation's shape
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReelcutError {
    pub fn config(message: impl Into<String>) -> Self {
        ReelcutError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for reelcut setup operations
pub type ReelcutResult<T> = std::result::Result<T, ReelcutError>;
