//! Broadcast request

use std::num::NonZeroU32;
use std::time::Duration;

use contracts::{BroadcastDefaults, DestinationId};
use dispatcher::ExclusionSet;

use crate::error::BroadcastError;

/// Validated parameters for one `broadcast` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    message: String,
    rounds: NonZeroU32,
    inter_round_delay: Duration,
    exclude: ExclusionSet,
}

impl BroadcastRequest {
    /// Rejects blank messages and `rounds == 0`
    pub fn new(
        message: impl Into<String>,
        rounds: u32,
        inter_round_delay: Duration,
    ) -> Result<Self, BroadcastError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(BroadcastError::invalid_request("message must not be blank"));
        }
        let rounds = NonZeroU32::new(rounds)
            .ok_or_else(|| BroadcastError::invalid_request("rounds must be at least 1"))?;

        Ok(Self {
            message,
            rounds,
            inter_round_delay,
            exclude: ExclusionSet::default(),
        })
    }

    /// Build from profile defaults; `message` overrides the profile's text
    pub fn from_defaults(
        defaults: &BroadcastDefaults,
        message: Option<String>,
    ) -> Result<Self, BroadcastError> {
        let message = message
            .or_else(|| defaults.message.clone())
            .ok_or_else(|| BroadcastError::invalid_request("no message given"))?;

        Ok(Self::new(
            message,
            defaults.rounds,
            Duration::from_secs(defaults.inter_round_delay_secs),
        )?
        .with_exclusions(defaults.exclude.iter().copied()))
    }

    pub fn with_exclusions(mut self, ids: impl IntoIterator<Item = DestinationId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.get()
    }

    pub fn inter_round_delay(&self) -> Duration {
        self.inter_round_delay
    }

    pub fn exclude(&self) -> &ExclusionSet {
        &self.exclude
    }
}
