//! BroadcastProfile - Config Loader output
//!
//! Describes the account, the default broadcast parameters, and the event sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::DestinationId;

/// Profile version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileVersion {
    #[default]
    V1,
}

/// Complete broadcast profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastProfile {
    #[serde(default)]
    pub version: ProfileVersion,

    /// Account session credentials
    pub account: Credentials,

    /// Broadcast defaults
    #[serde(default)]
    pub broadcast: BroadcastDefaults,

    /// Event sink routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Account credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_id: i32,

    pub api_hash: String,

    pub phone_number: String,

    /// Session file name used by the provider
    #[serde(default = "default_session_name")]
    pub session_name: String,
}

fn default_session_name() -> String {
    "userbot_session".to_string()
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("session_name", &self.session_name)
            .finish()
    }
}

/// Default broadcast parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastDefaults {
    /// Message used when none is given on the command line
    #[serde(default)]
    pub message: Option<String>,

    /// Full passes over the catalog, >= 1
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Pause between consecutive rounds
    #[serde(default = "default_inter_round_delay")]
    pub inter_round_delay_secs: u64,

    /// Destination ids never sent to
    #[serde(default)]
    pub exclude: Vec<DestinationId>,

    #[serde(default)]
    pub on_catalog_error: CatalogErrorPolicy,
}

fn default_rounds() -> u32 {
    2
}

fn default_inter_round_delay() -> u64 {
    10
}

impl Default for BroadcastDefaults {
    fn default() -> Self {
        Self {
            message: None,
            rounds: default_rounds(),
            inter_round_delay_secs: default_inter_round_delay(),
            exclude: Vec::new(),
            on_catalog_error: CatalogErrorPolicy::default(),
        }
    }
}

/// What a round does when catalog resolution fails with a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogErrorPolicy {
    /// Record a zero-send round and keep going
    #[default]
    SkipRound,
    /// Fail the whole broadcast
    Abort,
}

/// Event sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    256
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// tracing log output
    Log,
    /// JSON lines file
    File,
    /// In-process buffer
    Memory,
}
