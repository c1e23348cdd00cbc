//! Error types for the taskreaper-core library.

use thiserror::Error;

/// Result type alias for taskreaper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, resolving, killing or restarting processes.
#[derive(Error, Debug)]
pub enum Error {
    /// The process or window list could not be enumerated at all.
    #[error("Enumeration failed: {0}")]
    Enumeration(String),

    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// An action identifier that is unknown or not applicable to the selected entry.
    #[error("Invalid action '{action}': {reason}")]
    InvalidAction { action: String, reason: String },

    /// An execution was requested before any catalog was activated.
    #[error("No active process catalog; activate before executing")]
    NoActiveCatalog,

    /// A process (restart or elevated helper) could not be launched.
    #[error("Launch failed: {0}")]
    Launch(String),

    /// A captured command line could not be split into arguments.
    #[error("Malformed command line: {0}")]
    MalformedCommandLine(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Build an [`Error::InvalidAction`].
    pub fn invalid_action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAction {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

/// Why a process handle could not be opened.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    /// No process with that PID exists (any more).
    #[error("Process {0} not found")]
    NotFound(u32),

    /// The process exists but the caller lacks the rights to terminate it.
    #[error("Access denied to process {0}")]
    AccessDenied(u32),
}
