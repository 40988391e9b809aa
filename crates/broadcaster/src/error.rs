//! Broadcast error types

use catalog::CatalogError;
use dispatcher::DispatchError;
use thiserror::Error;

/// Errors that terminate a whole `broadcast` call
#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// Rejected before any provider call
    #[error("invalid broadcast request: {message}")]
    InvalidRequest { message: String },

    /// Catalog resolution failed and the policy (or the error) is fatal
    #[error("round {round}: {source}")]
    Catalog {
        round: u32,
        #[source]
        source: CatalogError,
    },

    /// Provider session dropped mid-dispatch
    #[error(transparent)]
    SessionLost(#[from] DispatchError),
}

impl BroadcastError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the provider session can no longer be used
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::SessionLost(_) => true,
            Self::Catalog { source, .. } => source.is_fatal(),
            Self::InvalidRequest { .. } => false,
        }
    }
}
