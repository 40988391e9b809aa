//! # Contracts
//!
//! Frozen interface contracts shared by every broadcaster crate: destination
//! and outcome types, the chat provider capability, the event stream, and the
//! broadcast profile. Business crates depend on this crate only; reverse
//! dependencies are prohibited.
//!
//! ## Time Model
//! - Provider cooldowns are expressed in whole seconds
//! - Event timestamps are UTC wall-clock, diagnostics only

mod destination;
mod destination_id;
mod error;
mod event;
mod outcome;
mod profile;
mod provider;
mod sink;

pub use destination::*;
pub use destination_id::DestinationId;
pub use error::*;
pub use event::*;
pub use outcome::*;
pub use profile::*;
pub use provider::{ChatProvider, LocalChatProvider};
pub use sink::*;
