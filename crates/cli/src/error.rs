//! Error types for CLI operations.

use broadcaster::BroadcastError;
use contracts::{ContractError, ProviderError};
use events::EventError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Profile file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Profile could not be loaded or failed validation
    #[error(transparent)]
    Config(#[from] ContractError),

    /// No chat provider is available for a command that needs one
    #[error("No chat provider configured: pass --fixture <path>")]
    ProviderMissing,

    /// Provider rejected the session
    #[error("Failed to connect: {0}")]
    Connect(#[source] ProviderError),

    /// Event sinks could not be created
    #[error(transparent)]
    Events(#[from] EventError),

    /// Broadcast aborted
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
