//! Destination - Catalog output
//!
//! Raw dialog records as reported by the chat provider, and the classified
//! destinations derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DestinationId;

/// Destination classification (display only, never affects delivery)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// Plain multi-user chat
    Group,
    /// Megagroup hosted on channel infrastructure
    Supergroup,
    /// Channel that is neither a megagroup nor broadcast-only
    Channel,
}

impl DestinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broadcast target, immutable for the duration of a dispatch pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Identity within a catalog snapshot
    pub id: DestinationId,

    /// Human-readable title, may change between snapshots
    pub display_name: String,

    pub kind: DestinationKind,
}

impl Destination {
    pub fn new(id: DestinationId, display_name: impl Into<String>, kind: DestinationKind) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// Entity behind a dialog, as exposed by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogEntity {
    /// One-to-one conversation
    User,
    /// Basic multi-user chat
    Chat,
    /// Channel-backed entity
    Channel {
        #[serde(default)]
        megagroup: bool,
        #[serde(default)]
        broadcast: bool,
    },
}

/// Opaque dialog record from `list_dialogs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub id: DestinationId,
    pub title: String,
    pub entity: DialogEntity,
}

impl Dialog {
    pub fn new(id: DestinationId, title: impl Into<String>, entity: DialogEntity) -> Self {
        Self {
            id,
            title: title.into(),
            entity,
        }
    }

    pub fn chat(id: i64, title: &str) -> Self {
        Self::new(DestinationId::new(id), title, DialogEntity::Chat)
    }

    pub fn megagroup(id: i64, title: &str) -> Self {
        Self::new(
            DestinationId::new(id),
            title,
            DialogEntity::Channel {
                megagroup: true,
                broadcast: false,
            },
        )
    }

    pub fn broadcast_channel(id: i64, title: &str) -> Self {
        Self::new(
            DestinationId::new(id),
            title,
            DialogEntity::Channel {
                megagroup: false,
                broadcast: true,
            },
        )
    }

    pub fn user(id: i64, title: &str) -> Self {
        Self::new(DestinationId::new(id), title, DialogEntity::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_entity_deserialize_defaults_flags() {
        let dialog: Dialog =
            serde_json::from_str(r#"{"id": 5, "title": "x", "entity": {"type": "channel"}}"#)
                .unwrap();
        assert_eq!(
            dialog.entity,
            DialogEntity::Channel {
                megagroup: false,
                broadcast: false
            }
        );
    }

    #[test]
    fn test_destination_display() {
        let dest = Destination::new(DestinationId::new(10), "Rust Users", DestinationKind::Supergroup);
        assert_eq!(dest.to_string(), "Rust Users (10)");
        assert_eq!(dest.kind.to_string(), "supergroup");
    }
}
