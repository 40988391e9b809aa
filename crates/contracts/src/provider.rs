//! ChatProvider trait - external chat-service capability
//!
//! Abstracts the account session: lifecycle, dialog enumeration and message
//! transmission. The engine never speaks the wire protocol itself.

use crate::{Credentials, Destination, Dialog, ProviderError, SendError};

/// Chat provider capability
///
/// Mock and real sessions implement the same API. Sends are issued strictly
/// one at a time by the engine, so implementations need no internal ordering
/// guarantees beyond being `Sync`.
#[trait_variant::make(ChatProvider: Send)]
pub trait LocalChatProvider {
    /// Connect and authenticate the account session
    async fn connect(&mut self, credentials: &Credentials) -> Result<(), ProviderError>;

    /// Full dialog list of the account, in provider order
    async fn list_dialogs(&self) -> Result<Vec<Dialog>, ProviderError>;

    /// Send `text` to `destination`
    ///
    /// # Errors
    /// Classified send failure; `SendError::Disconnected` means the session is gone.
    async fn send_message(&self, destination: &Destination, text: &str) -> Result<(), SendError>;

    /// Close the session; idempotent
    async fn disconnect(&mut self) -> Result<(), ProviderError>;
}
