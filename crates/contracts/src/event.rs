//! BroadcastEvent - structured observability stream
//!
//! Every engine operation publishes these; per-destination failure detail is
//! only ever surfaced here and in logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BroadcastSummary, DestinationId, RoundResult, SendOutcome};

/// Engine event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BroadcastEvent {
    BroadcastStarted {
        rounds: u32,
        inter_round_delay_secs: u64,
        excluded_ids: usize,
    },
    CatalogResolved {
        round: u32,
        destinations: usize,
    },
    CatalogFailed {
        round: u32,
        error: String,
    },
    DestinationSkipped {
        round: u32,
        destination_id: DestinationId,
        title: String,
    },
    CooldownStarted {
        round: u32,
        destination_id: DestinationId,
        wait_secs: u64,
    },
    DeliveryRecorded {
        round: u32,
        destination_id: DestinationId,
        title: String,
        outcome: SendOutcome,
        retried: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    RoundCompleted {
        result: RoundResult,
    },
    InterRoundPause {
        after_round: u32,
        delay_secs: u64,
    },
    BroadcastCancelled {
        round: u32,
    },
    BroadcastCompleted {
        summary: BroadcastSummary,
    },
}

impl BroadcastEvent {
    /// Short event name, matches the serialized tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BroadcastStarted { .. } => "broadcast_started",
            Self::CatalogResolved { .. } => "catalog_resolved",
            Self::CatalogFailed { .. } => "catalog_failed",
            Self::DestinationSkipped { .. } => "destination_skipped",
            Self::CooldownStarted { .. } => "cooldown_started",
            Self::DeliveryRecorded { .. } => "delivery_recorded",
            Self::RoundCompleted { .. } => "round_completed",
            Self::InterRoundPause { .. } => "inter_round_pause",
            Self::BroadcastCancelled { .. } => "broadcast_cancelled",
            Self::BroadcastCompleted { .. } => "broadcast_completed",
        }
    }
}

/// Event stamped with publish time and a sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Monotonic per-bus sequence
    pub seq: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: BroadcastEvent,
}

impl EventEnvelope {
    pub fn new(seq: u64, event: BroadcastEvent) -> Self {
        Self {
            seq,
            at: Utc::now(),
            event,
        }
    }
}
