//! Round Controller
//!
//! 每轮：解析目录 → 过滤 → 投递 → 记账；轮间暂停恰好 `R - 1` 次。

use catalog::DestinationCatalog;
use contracts::{
    BroadcastEvent, BroadcastSummary, CatalogErrorPolicy, ChatProvider, DeliveryRecord,
    Destination, RoundResult, SendOutcome,
};
use dispatcher::{filter, DispatchLoop, ExclusionSet, Pacer, Partition, PauseReason};
use events::EventBus;
use observability::{BroadcastMetricsAggregator, MetricsSummary};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::{catalog_failed_round, fold_round, ResultAggregator};
use crate::error::BroadcastError;
use crate::request::BroadcastRequest;

/// Broadcast engine over one connected provider session
pub struct Broadcaster<'a, P, Z> {
    provider: &'a P,
    pacer: Z,
    events: &'a EventBus,
    cancel: Option<CancellationToken>,
    catalog_policy: CatalogErrorPolicy,
    metrics: BroadcastMetricsAggregator,
}

impl<'a, P, Z> Broadcaster<'a, P, Z>
where
    P: ChatProvider,
    Z: Pacer,
{
    pub fn new(provider: &'a P, pacer: Z, events: &'a EventBus) -> Self {
        Self {
            provider,
            pacer,
            events,
            cancel: None,
            catalog_policy: CatalogErrorPolicy::default(),
            metrics: BroadcastMetricsAggregator::new(),
        }
    }

    /// Checked before every round and every destination
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_catalog_policy(mut self, policy: CatalogErrorPolicy) -> Self {
        self.catalog_policy = policy;
        self
    }

    pub fn pacer(&self) -> &Z {
        &self.pacer
    }

    /// In-memory statistics over every broadcast run by this engine
    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Current catalog, for display
    pub async fn list_destinations(&self) -> Result<Vec<Destination>, BroadcastError> {
        DestinationCatalog::new(self.provider)
            .resolve()
            .await
            .map_err(|source| BroadcastError::Catalog { round: 0, source })
    }

    /// Resolve and filter without sending
    pub async fn plan(&self, exclude: &ExclusionSet) -> Result<Partition, BroadcastError> {
        let destinations = self.list_destinations().await?;
        Ok(filter(destinations, exclude))
    }

    /// Run `request.rounds()` full passes
    #[instrument(
        name = "broadcaster_broadcast",
        skip(self, request),
        fields(
            rounds = request.rounds(),
            delay_secs = request.inter_round_delay().as_secs(),
            excluded = request.exclude().len()
        )
    )]
    pub async fn broadcast(
        &mut self,
        request: &BroadcastRequest,
    ) -> Result<BroadcastSummary, BroadcastError> {
        let rounds = request.rounds();
        let mut aggregator = ResultAggregator::new(rounds);

        self.events.publish(BroadcastEvent::BroadcastStarted {
            rounds,
            inter_round_delay_secs: request.inter_round_delay().as_secs(),
            excluded_ids: request.exclude().len(),
        });
        info!(rounds, "Broadcast started");

        for round in 1..=rounds {
            if self.is_cancelled() {
                self.cancelled(round, &mut aggregator);
                break;
            }

            let result = self.run_round(round, request).await.inspect_err(|e| {
                error!(round, error = %e, "Broadcast aborted");
            })?;
            let interrupted = result.interrupted;
            self.complete_round(result, &mut aggregator);

            if interrupted {
                self.cancelled(round, &mut aggregator);
                break;
            }

            if round < rounds {
                if self.is_cancelled() {
                    self.cancelled(round + 1, &mut aggregator);
                    break;
                }
                self.pause_between_rounds(round, request).await;
            }
        }

        let summary = aggregator.finish();
        info!(
            total_success = summary.total_success,
            total_failed = summary.total_failed,
            total_excluded = summary.total_excluded,
            rounds_executed = summary.rounds_executed,
            cancelled = summary.cancelled,
            "Broadcast finished"
        );
        self.events.publish(BroadcastEvent::BroadcastCompleted {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    #[instrument(name = "broadcaster_round", skip(self, request))]
    async fn run_round(
        &mut self,
        round: u32,
        request: &BroadcastRequest,
    ) -> Result<RoundResult, BroadcastError> {
        let destinations = match DestinationCatalog::new(self.provider).resolve().await {
            Ok(destinations) => destinations,
            Err(source) => {
                let fatal = source.is_fatal();
                observability::record_catalog_failure(fatal);
                self.events.publish(BroadcastEvent::CatalogFailed {
                    round,
                    error: source.to_string(),
                });

                if fatal || self.catalog_policy == CatalogErrorPolicy::Abort {
                    return Err(BroadcastError::Catalog { round, source });
                }
                warn!(round, error = %source, "Catalog unavailable, skipping round");
                return Ok(catalog_failed_round(round));
            }
        };

        let catalog_size = destinations.len();
        observability::record_catalog_resolved(catalog_size);
        self.events.publish(BroadcastEvent::CatalogResolved {
            round,
            destinations: catalog_size,
        });

        let Partition { accepted, skipped } = filter(destinations, request.exclude());
        for destination in &skipped {
            debug!(round, destination = %destination, "Excluded");
            self.events.publish(BroadcastEvent::DestinationSkipped {
                round,
                destination_id: destination.id,
                title: destination.display_name.clone(),
            });
        }

        let mut dispatch = DispatchLoop::new(self.provider, &self.pacer, self.events);
        if let Some(token) = &self.cancel {
            dispatch = dispatch.with_cancellation(token);
        }
        let report = dispatch
            .dispatch_once(round, &accepted, request.message())
            .await?;

        for wait_secs in &report.cooldowns {
            self.metrics.update_cooldown(*wait_secs);
        }

        let mut records = report.records;
        records.extend(skipped.into_iter().map(|destination| {
            observability::record_delivery(SendOutcome::SkippedExcluded);
            DeliveryRecord::excluded(destination)
        }));
        for record in &records {
            self.metrics.update_delivery(record);
        }

        Ok(fold_round(
            round,
            catalog_size,
            &records,
            report.not_attempted.len(),
        ))
    }

    fn complete_round(&mut self, result: RoundResult, aggregator: &mut ResultAggregator) {
        info!(
            round = result.round,
            sent = result.sent,
            failed = result.failed,
            excluded = result.excluded,
            not_attempted = result.not_attempted,
            catalog_failed = result.catalog_failed,
            "Round completed"
        );
        observability::record_round_completed(&result);
        self.metrics.update_round(&result);
        self.events.publish(BroadcastEvent::RoundCompleted {
            result: result.clone(),
        });
        aggregator.push(result);
    }

    fn cancelled(&self, round: u32, aggregator: &mut ResultAggregator) {
        warn!(round, "Broadcast cancelled");
        aggregator.mark_cancelled();
        self.events.publish(BroadcastEvent::BroadcastCancelled { round });
    }

    async fn pause_between_rounds(&self, after_round: u32, request: &BroadcastRequest) {
        let delay = request.inter_round_delay();
        if delay.is_zero() {
            return;
        }
        info!(
            after_round,
            delay_secs = delay.as_secs(),
            "Waiting before next round"
        );
        self.events.publish(BroadcastEvent::InterRoundPause {
            after_round,
            delay_secs: delay.as_secs(),
        });
        self.pacer.pause(delay, PauseReason::InterRound).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use catalog::{MockChatProvider, MockConfig, ScriptedListFailure, ScriptedSend};
    use contracts::{DestinationId, Dialog};
    use dispatcher::RecordingPacer;
    use events::{MemorySink, SinkHandle};

    fn provider(config: MockConfig) -> MockChatProvider {
        MockChatProvider::connected(config)
    }

    fn three_groups() -> MockConfig {
        MockConfig::default().with_dialogs(vec![
            Dialog::chat(1, "A"),
            Dialog::megagroup(2, "B"),
            Dialog::chat(3, "C"),
        ])
    }

    #[tokio::test]
    async fn test_exclusion_scenario() {
        let provider = provider(three_groups());
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 1, Duration::ZERO)
            .unwrap()
            .with_exclusions([DestinationId::new(2)]);
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(
            provider.attempted_ids(),
            vec![DestinationId::new(1), DestinationId::new(3)]
        );
        assert_eq!(summary.total_success, 2);
        assert_eq!(summary.total_failed, 0);
        assert_eq!(summary.total_excluded, 1);
        assert!(summary.rounds[0].is_balanced());
    }

    #[tokio::test]
    async fn test_repeated_failure_scenario() {
        let config = MockConfig::default()
            .with_dialogs(vec![Dialog::chat(7, "Only")])
            .script(
                7,
                vec![],
                ScriptedSend::Other {
                    message: "nope".into(),
                },
            );
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 3, Duration::from_secs(10)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.total_failed, 3);
        assert_eq!(summary.total_success, 0);
        assert_eq!(summary.rounds_executed, 3);
        assert_eq!(
            engine.pacer().pauses(),
            vec![(Duration::from_secs(10), PauseReason::InterRound); 2]
        );
        assert_eq!(provider.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_delay_never_pauses() {
        let provider = provider(three_groups());
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 2, Duration::ZERO).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.total_success, 6);
        assert!(engine.pacer().pauses().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_reresolved_each_round() {
        let config = MockConfig::default()
            .then_dialogs(vec![Dialog::chat(1, "A"), Dialog::chat(2, "B")])
            .then_dialogs(vec![Dialog::chat(1, "A")]);
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 2, Duration::from_secs(1)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.rounds[0].catalog_size, 2);
        assert_eq!(summary.rounds[1].catalog_size, 1);
        assert_eq!(summary.total_success, 3);
    }

    #[tokio::test]
    async fn test_catalog_failure_skips_round() {
        let config = three_groups().fail_listing(ScriptedListFailure::Transport {
            message: "timeout".into(),
        });
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 2, Duration::from_secs(5)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert!(summary.rounds[0].catalog_failed);
        assert_eq!(summary.rounds[0].sent, 0);
        assert_eq!(summary.rounds[1].sent, 3);
        assert_eq!(summary.rounds_executed, 2);
        assert_eq!(engine.pacer().pauses().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_abort_policy() {
        let config = three_groups().fail_listing(ScriptedListFailure::Transport {
            message: "timeout".into(),
        });
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus)
            .with_catalog_policy(CatalogErrorPolicy::Abort);

        let request = BroadcastRequest::new("hi", 2, Duration::ZERO).unwrap();
        let err = engine.broadcast(&request).await.unwrap_err();

        assert!(matches!(err, BroadcastError::Catalog { round: 1, .. }));
        assert!(!err.is_session_lost());
        assert!(provider.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_disconnect_always_aborts() {
        let config = three_groups().fail_listing(ScriptedListFailure::Disconnected {
            message: "gone".into(),
        });
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 2, Duration::ZERO).unwrap();
        let err = engine.broadcast(&request).await.unwrap_err();

        assert!(err.is_session_lost());
    }

    #[tokio::test]
    async fn test_session_lost_aborts_broadcast() {
        let config = three_groups().script(2, vec![], ScriptedSend::Disconnected);
        let provider = provider(config);
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hi", 3, Duration::from_secs(10)).unwrap();
        let err = engine.broadcast(&request).await.unwrap_err();

        assert!(matches!(err, BroadcastError::SessionLost(_)));
        assert_eq!(provider.attempts().len(), 2);
        assert!(engine.pacer().pauses().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let provider = provider(three_groups());
        let bus = EventBus::disabled();
        let token = CancellationToken::new();
        token.cancel();
        let mut engine =
            Broadcaster::new(&provider, RecordingPacer::new(), &bus).with_cancellation(token);

        let request = BroadcastRequest::new("hi", 2, Duration::from_secs(1)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.rounds_executed, 0);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_plan_does_not_send() {
        let provider = provider(three_groups());
        let bus = EventBus::disabled();
        let engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let exclude: ExclusionSet = [DestinationId::new(3)].into_iter().collect();
        let plan = engine.plan(&exclude).await.unwrap();

        assert_eq!(plan.accepted.len(), 2);
        assert_eq!(plan.skipped.len(), 1);
        assert!(provider.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_event_stream() {
        let provider = provider(
            MockConfig::default().with_dialogs(vec![Dialog::chat(1, "A"), Dialog::chat(2, "B")]),
        );
        let sink = MemorySink::new("memory");
        let buffer = sink.buffer();
        let bus = EventBus::with_handles(vec![SinkHandle::spawn(sink, 64)]);
        {
            let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);
            let request = BroadcastRequest::new("hi", 2, Duration::from_secs(3))
                .unwrap()
                .with_exclusions([DestinationId::new(2)]);
            engine.broadcast(&request).await.unwrap();

            let metrics = engine.metrics();
            assert_eq!(metrics.rounds, 2);
            assert_eq!(metrics.sent, 2);
            assert_eq!(metrics.excluded, 2);
        }
        bus.shutdown().await;

        assert_eq!(
            buffer.kinds(),
            vec![
                "broadcast_started",
                "catalog_resolved",
                "destination_skipped",
                "delivery_recorded",
                "round_completed",
                "inter_round_pause",
                "catalog_resolved",
                "destination_skipped",
                "delivery_recorded",
                "round_completed",
                "broadcast_completed",
            ]
        );
    }
}
