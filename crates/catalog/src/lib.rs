//! # Catalog
//!
//! Destination catalog module.
//!
//! Responsibilities:
//! - Enumerate the account's dialogs through a `ChatProvider`
//! - Keep only multi-user chats that accept member posts
//! - Classify each as group / supergroup / channel
//! - Provide a scriptable `MockChatProvider` for tests and offline runs

pub mod catalog;
pub mod error;
pub mod mock_provider;

pub use catalog::{classify, DestinationCatalog};
pub use contracts::{ChatProvider, Destination, DestinationKind, Dialog, DialogEntity};
pub use error::{CatalogError, Result};
pub use mock_provider::{
    MockChatProvider, MockConfig, ScriptedListFailure, ScriptedSend, SendAttempt, SendScript,
};
