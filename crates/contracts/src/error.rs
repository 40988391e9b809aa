//! Layered error definitions
//!
//! Categorized by source: config / provider / send / sink

use thiserror::Error;

/// Unified error type for configuration and sink plumbing
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Session-level provider failure (connect, enumerate, disconnect)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Authentication rejected or incomplete
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Transient transport failure; the session is still usable
    #[error("provider transport error: {message}")]
    Transport { message: String },

    /// The session itself is gone; nothing further can succeed
    #[error("provider session disconnected: {message}")]
    Disconnected { message: String },
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::Disconnected {
            message: message.into(),
        }
    }

    /// Whether the session can no longer be used
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Transport { .. })
    }
}

/// Failure of a single message send
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Provider-mandated cooldown, applies account-wide
    #[error("rate limited, retry after {wait_secs}s")]
    RateLimited { wait_secs: u64 },

    /// Account may not post in this destination
    #[error("write permission denied")]
    PermissionDenied,

    /// Account is banned in this destination
    #[error("account banned in destination")]
    AccountBanned,

    /// The session dropped mid-send
    #[error("session disconnected: {message}")]
    Disconnected { message: String },

    /// Anything the provider did not classify
    #[error("{message}")]
    Other { message: String },
}

impl SendError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::Disconnected {
            message: message.into(),
        }
    }
}
