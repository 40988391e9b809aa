//! Delivery outcomes and broadcast accounting types
//!
//! Produced by the dispatch loop, folded by the result aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Destination;

/// Result of one delivery attempt to one destination in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    Sent,
    SkippedExcluded,
    FailedPermission,
    FailedBanned,
    /// The single post-cooldown retry also failed
    FailedRateLimited,
    FailedOther,
}

impl SendOutcome {
    pub const ALL: [SendOutcome; 6] = [
        SendOutcome::Sent,
        SendOutcome::SkippedExcluded,
        SendOutcome::FailedPermission,
        SendOutcome::FailedBanned,
        SendOutcome::FailedRateLimited,
        SendOutcome::FailedOther,
    ];

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FailedPermission | Self::FailedBanned | Self::FailedRateLimited | Self::FailedOther
        )
    }

    /// Metric label / log field value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::SkippedExcluded => "skipped_excluded",
            Self::FailedPermission => "failed_permission",
            Self::FailedBanned => "failed_banned",
            Self::FailedRateLimited => "failed_rate_limited",
            Self::FailedOther => "failed_other",
        }
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one (destination, round) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub destination: Destination,
    pub outcome: SendOutcome,
    /// Whether a post-cooldown retry was made
    #[serde(default)]
    pub retried: bool,
    /// Provider error text, observability only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DeliveryRecord {
    pub fn new(destination: Destination, outcome: SendOutcome) -> Self {
        Self {
            destination,
            outcome,
            retried: false,
            detail: None,
        }
    }

    pub fn excluded(destination: Destination) -> Self {
        Self::new(destination, SendOutcome::SkippedExcluded)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_retry(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// Failure counts by class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBreakdown {
    pub permission: usize,
    pub banned: usize,
    pub rate_limited: usize,
    pub other: usize,
}

impl FailureBreakdown {
    pub fn total(&self) -> usize {
        self.permission + self.banned + self.rate_limited + self.other
    }
}

/// Counts for one completed round, immutable once built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round number
    pub round: u32,

    /// Size of the catalog snapshot resolved for this round
    pub catalog_size: usize,

    pub sent: usize,
    pub failed: usize,
    pub excluded: usize,

    /// Destinations left untouched after cancellation
    pub not_attempted: usize,

    pub failures: FailureBreakdown,

    /// Catalog resolution failed and the round was skipped
    pub catalog_failed: bool,

    /// Cancelled before every destination was attempted
    pub interrupted: bool,
}

impl RoundResult {
    /// `sent + failed + excluded + not_attempted == catalog_size`
    pub fn is_balanced(&self) -> bool {
        self.sent + self.failed + self.excluded + self.not_attempted == self.catalog_size
    }
}

/// Accumulated totals across all executed rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSummary {
    pub total_success: u64,
    pub total_failed: u64,
    pub total_excluded: u64,
    pub rounds_requested: u32,
    pub rounds_executed: u32,
    pub cancelled: bool,
    pub rounds: Vec<RoundResult>,
}

impl fmt::Display for BroadcastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total messages sent: {}", self.total_success)?;
        writeln!(f, "Total failed: {}", self.total_failed)?;
        if self.total_excluded > 0 {
            writeln!(f, "Total excluded: {}", self.total_excluded)?;
        }
        write!(
            f,
            "Rounds completed: {}/{}",
            self.rounds_executed, self.rounds_requested
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
