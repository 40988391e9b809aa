//! Dispatch error types

use contracts::DestinationId;
use thiserror::Error;

/// Errors that end a dispatch pass early
///
/// Per-destination failures are never errors; they become `SendOutcome`s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The provider session dropped
    #[error("session lost while sending to {destination_id}: {message}")]
    SessionLost {
        destination_id: DestinationId,
        message: String,
    },
}
