//! Result Aggregator
//!
//! 纯记账：把投递记录折叠为计数，不做任何策略决定。

use contracts::{BroadcastSummary, DeliveryRecord, FailureBreakdown, RoundResult, SendOutcome};

/// Fold one round's records into a `RoundResult`
///
/// `records` holds attempted and excluded destinations; `not_attempted`
/// counts the ones left behind by cancellation.
pub fn fold_round(
    round: u32,
    catalog_size: usize,
    records: &[DeliveryRecord],
    not_attempted: usize,
) -> RoundResult {
    let mut result = RoundResult {
        round,
        catalog_size,
        not_attempted,
        interrupted: not_attempted > 0,
        ..Default::default()
    };

    for record in records {
        match record.outcome {
            SendOutcome::Sent => result.sent += 1,
            SendOutcome::SkippedExcluded => result.excluded += 1,
            failure => {
                result.failed += 1;
                count_failure(&mut result.failures, failure);
            }
        }
    }

    result
}

fn count_failure(failures: &mut FailureBreakdown, outcome: SendOutcome) {
    match outcome {
        SendOutcome::FailedPermission => failures.permission += 1,
        SendOutcome::FailedBanned => failures.banned += 1,
        SendOutcome::FailedRateLimited => failures.rate_limited += 1,
        SendOutcome::FailedOther => failures.other += 1,
        SendOutcome::Sent | SendOutcome::SkippedExcluded => {}
    }
}

/// Round skipped because the catalog could not be resolved
pub fn catalog_failed_round(round: u32) -> RoundResult {
    RoundResult {
        round,
        catalog_failed: true,
        ..Default::default()
    }
}

/// Accumulates round results into a `BroadcastSummary`
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    summary: BroadcastSummary,
}

impl ResultAggregator {
    pub fn new(rounds_requested: u32) -> Self {
        Self {
            summary: BroadcastSummary {
                rounds_requested,
                ..Default::default()
            },
        }
    }

    pub fn push(&mut self, result: RoundResult) {
        self.summary.total_success += result.sent as u64;
        self.summary.total_failed += result.failed as u64;
        self.summary.total_excluded += result.excluded as u64;
        self.summary.rounds_executed += 1;
        self.summary.rounds.push(result);
    }

    pub fn mark_cancelled(&mut self) {
        self.summary.cancelled = true;
    }

    pub fn finish(self) -> BroadcastSummary {
        self.summary
    }
}
