//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（Scenarios A-D，无需真实账号）
//! - 取消与目录失败策略

#[cfg(test)]
mod contract_tests {
    use contracts::{BroadcastEvent, EventEnvelope, ProfileVersion, SendOutcome};

    #[test]
    fn test_profile_version_wire_shape() {
        assert_eq!(ProfileVersion::default(), ProfileVersion::V1);
        assert_eq!(serde_json::to_value(ProfileVersion::V1).unwrap(), "V1");
        let parsed: ProfileVersion = serde_json::from_str("\"V1\"").unwrap();
        assert_eq!(parsed, ProfileVersion::V1);
    }

    #[test]
    fn test_event_wire_shape() {
        let envelope = EventEnvelope::new(
            0,
            BroadcastEvent::DeliveryRecorded {
                round: 1,
                destination_id: contracts::DestinationId::new(-100),
                title: "G".into(),
                outcome: SendOutcome::FailedPermission,
                retried: false,
                detail: None,
            },
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["event"], "delivery_recorded");
        assert_eq!(value["outcome"], "failed_permission");
        assert_eq!(value["destination_id"], -100);
        assert!(value.get("detail").is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use broadcaster::{BroadcastError, BroadcastRequest, Broadcaster, CatalogErrorPolicy};
    use catalog::{
        DestinationCatalog, MockChatProvider, MockConfig, ScriptedListFailure, ScriptedSend,
    };
    use config_loader::ConfigLoader;
    use contracts::{
        ChatProvider, Credentials, DestinationId, DestinationKind, Dialog, SendOutcome, SinkConfig,
        SinkType,
    };
    use dispatcher::{DispatchLoop, PauseReason, RecordingPacer};
    use events::{create_event_bus, EventBus, MemorySink, SinkHandle};
    use tokio_util::sync::CancellationToken;

    fn credentials() -> Credentials {
        Credentials {
            api_id: 1,
            api_hash: "hash".into(),
            phone_number: "+10000000000".into(),
            session_name: "test_session".into(),
        }
    }

    async fn connect(config: MockConfig) -> MockChatProvider {
        let mut provider = MockChatProvider::new(config);
        provider.connect(&credentials()).await.unwrap();
        provider
    }

    fn ids(values: &[i64]) -> Vec<DestinationId> {
        values.iter().copied().map(DestinationId::new).collect()
    }

    /// Scenario A: broadcast-only channels never enter the catalog
    #[tokio::test]
    async fn test_scenario_a_catalog_classification() {
        let provider = connect(MockConfig::default().with_dialogs(vec![
            Dialog::chat(1, "G1"),
            Dialog::megagroup(2, "G2"),
            Dialog::broadcast_channel(3, "C1"),
            Dialog::user(4, "Alice"),
        ]))
        .await;

        let destinations = DestinationCatalog::new(&provider).resolve().await.unwrap();

        let resolved: Vec<_> = destinations.iter().map(|d| (d.id, d.kind)).collect();
        assert_eq!(
            resolved,
            vec![
                (DestinationId::new(1), DestinationKind::Group),
                (DestinationId::new(2), DestinationKind::Supergroup),
            ]
        );
    }

    /// Scenario B: excluded destination is neither attempted nor counted
    #[tokio::test]
    async fn test_scenario_b_exclusion() {
        let provider = connect(MockConfig::default().with_dialogs(vec![
            Dialog::chat(10, "A"),
            Dialog::chat(20, "B"),
            Dialog::chat(30, "C"),
        ]))
        .await;
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hello", 1, Duration::ZERO)
            .unwrap()
            .with_exclusions([DestinationId::new(20)]);
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(provider.attempted_ids(), ids(&[10, 30]));
        assert_eq!(summary.total_success, 2);
        assert_eq!(summary.total_failed, 0);
        assert_eq!(summary.rounds[0].excluded, 1);
        assert!(summary.rounds[0].is_balanced());
    }

    /// Scenario C: one global cooldown of w + 1, retry succeeds, permission failure is final
    #[tokio::test]
    async fn test_scenario_c_rate_limit_then_permission() {
        let provider = connect(
            MockConfig::default()
                .with_dialogs(vec![
                    Dialog::chat(1, "A"),
                    Dialog::chat(2, "B"),
                    Dialog::chat(3, "C"),
                ])
                .script(
                    2,
                    vec![ScriptedSend::RateLimited { wait_secs: 5 }],
                    ScriptedSend::Ok,
                )
                .script(3, vec![], ScriptedSend::PermissionDenied),
        )
        .await;
        let destinations = DestinationCatalog::new(&provider).resolve().await.unwrap();
        let pacer = RecordingPacer::new();
        let bus = EventBus::disabled();

        let report = DispatchLoop::new(&provider, &pacer, &bus)
            .dispatch_once(1, &destinations, "hello")
            .await
            .unwrap();

        let outcomes: Vec<_> = report
            .records
            .iter()
            .map(|r| (r.destination.id.get(), r.outcome))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (1, SendOutcome::Sent),
                (2, SendOutcome::Sent),
                (3, SendOutcome::FailedPermission)
            ]
        );
        assert!(pacer.total() >= Duration::from_secs(6));
        assert_eq!(
            pacer.pauses_for(PauseReason::Cooldown),
            vec![Duration::from_secs(6)]
        );
        // C 不重试
        assert_eq!(provider.attempted_ids(), ids(&[1, 2, 2, 3]));
    }

    /// Scenario D: R rounds, R - 1 pauses, failures accumulate
    #[tokio::test]
    async fn test_scenario_d_rounds_and_pauses() {
        let provider = connect(
            MockConfig::default()
                .with_dialogs(vec![Dialog::chat(1, "Only")])
                .script(
                    1,
                    vec![],
                    ScriptedSend::Other {
                        message: "flood".into(),
                    },
                ),
        )
        .await;
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hello", 3, Duration::from_secs(10)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.total_failed, 3);
        assert_eq!(summary.total_success, 0);
        assert_eq!(summary.rounds_executed, 3);
        assert_eq!(
            engine.pacer().pauses_for(PauseReason::InterRound),
            vec![Duration::from_secs(10); 2]
        );
        assert_eq!(provider.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_at_most_once_per_round() {
        let provider = connect(
            MockConfig::default()
                .with_dialogs(vec![Dialog::chat(1, "A"), Dialog::chat(2, "B")])
                .script(1, vec![], ScriptedSend::RateLimited { wait_secs: 0 }),
        )
        .await;
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hello", 2, Duration::ZERO).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.total_success, 2);
        assert_eq!(summary.total_failed, 2);
        assert!(summary
            .rounds
            .iter()
            .all(|r| r.failures.rate_limited == 1));
        // 每轮：1, 1(重试), 2
        assert_eq!(provider.attempts().len(), 6);
        assert_eq!(
            engine.pacer().pauses_for(PauseReason::Cooldown),
            vec![Duration::from_secs(1); 2]
        );
    }

    #[tokio::test]
    async fn test_cancellation_mid_round() {
        // 冷却暂停时取消：当前目标的重试照常进行，之后不再发送
        let provider = connect(
            MockConfig::default()
                .with_dialogs(vec![
                    Dialog::chat(1, "A"),
                    Dialog::chat(2, "B"),
                    Dialog::chat(3, "C"),
                ])
                .script(
                    1,
                    vec![ScriptedSend::RateLimited { wait_secs: 1 }],
                    ScriptedSend::Ok,
                ),
        )
        .await;
        let bus = EventBus::disabled();
        let token = CancellationToken::new();
        let pacer = CancellingPacer {
            token: token.clone(),
        };
        let mut engine =
            Broadcaster::new(&provider, pacer, &bus).with_cancellation(token.clone());

        let request = BroadcastRequest::new("hello", 2, Duration::from_secs(5)).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.rounds_executed, 1);
        let round = &summary.rounds[0];
        assert!(round.interrupted);
        assert_eq!(round.sent, 1);
        assert_eq!(round.not_attempted, 2);
        assert!(round.is_balanced());
        assert_eq!(provider.attempted_ids(), ids(&[1, 1]));
    }

    /// Cancels its token whenever asked to pause
    struct CancellingPacer {
        token: CancellationToken,
    }

    impl dispatcher::Pacer for CancellingPacer {
        async fn pause(&self, _duration: Duration, _reason: PauseReason) {
            self.token.cancel();
        }
    }

    #[tokio::test]
    async fn test_catalog_policies() {
        let failing = || {
            MockConfig::default()
                .with_dialogs(vec![Dialog::chat(1, "A")])
                .fail_listing(ScriptedListFailure::Transport {
                    message: "timeout".into(),
                })
        };
        let bus = EventBus::disabled();

        let provider = connect(failing()).await;
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);
        let request = BroadcastRequest::new("hello", 2, Duration::ZERO).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();
        assert!(summary.rounds[0].catalog_failed);
        assert_eq!(summary.total_success, 1);

        let provider = connect(failing()).await;
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus)
            .with_catalog_policy(CatalogErrorPolicy::Abort);
        let err = engine.broadcast(&request).await.unwrap_err();
        assert!(matches!(err, BroadcastError::Catalog { round: 1, .. }));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_zero_send_round() {
        let provider = connect(MockConfig::default()).await;
        let bus = EventBus::disabled();
        let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);

        let request = BroadcastRequest::new("hello", 1, Duration::ZERO).unwrap();
        let summary = engine.broadcast(&request).await.unwrap();

        assert_eq!(summary.rounds_executed, 1);
        assert_eq!(summary.rounds[0].catalog_size, 0);
        assert!(!summary.rounds[0].catalog_failed);
    }

    /// Profile + fixture from disk, events to a JSON-lines file
    #[tokio::test]
    async fn test_e2e_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let fixture_path = dir.path().join("fixture.json");
        let events_path = dir.path().join("events.jsonl");

        let fixture = MockConfig::default()
            .with_dialogs(vec![
                Dialog::chat(-1, "A"),
                Dialog::megagroup(-2, "B"),
                Dialog::broadcast_channel(-3, "News"),
            ])
            .script(-2, vec![], ScriptedSend::AccountBanned);
        std::fs::write(&fixture_path, serde_json::to_string(&fixture).unwrap()).unwrap();

        let fixture: MockConfig = ConfigLoader::load_document(&fixture_path).unwrap();
        let provider = connect(fixture).await;

        let sinks = vec![
            SinkConfig {
                name: "file".into(),
                sink_type: SinkType::File,
                queue_capacity: 64,
                params: [(
                    "path".to_string(),
                    events_path.to_string_lossy().into_owned(),
                )]
                .into_iter()
                .collect(),
            },
            SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 64,
                params: Default::default(),
            },
        ];
        let bus = create_event_bus(&sinks).unwrap();
        let summary = {
            let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);
            let request = BroadcastRequest::new("hello", 1, Duration::ZERO).unwrap();
            engine.broadcast(&request).await.unwrap()
        };
        bus.shutdown().await;

        assert_eq!(summary.total_success, 1);
        assert_eq!(summary.total_failed, 1);
        assert_eq!(summary.rounds[0].failures.banned, 1);

        let lines: Vec<serde_json::Value> = std::fs::read_to_string(&events_path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let kinds: Vec<&str> = lines
            .iter()
            .map(|v| v["event"].as_str().unwrap())
            .collect();
        assert_eq!(kinds.first(), Some(&"broadcast_started"));
        assert_eq!(kinds.last(), Some(&"broadcast_completed"));
        assert_eq!(kinds.iter().filter(|k| **k == "delivery_recorded").count(), 2);
        let seqs: Vec<u64> = lines.iter().map(|v| v["seq"].as_u64().unwrap()).collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_memory_sink_sees_cooldown() {
        let provider = connect(
            MockConfig::default()
                .with_dialogs(vec![Dialog::chat(1, "A")])
                .script(
                    1,
                    vec![ScriptedSend::RateLimited { wait_secs: 2 }],
                    ScriptedSend::Ok,
                ),
        )
        .await;
        let sink = MemorySink::new("memory");
        let buffer = sink.buffer();
        let bus = EventBus::with_handles(vec![SinkHandle::spawn(sink, 32)]);
        {
            let mut engine = Broadcaster::new(&provider, RecordingPacer::new(), &bus);
            let request = BroadcastRequest::new("hello", 1, Duration::ZERO).unwrap();
            engine.broadcast(&request).await.unwrap();
        }
        bus.shutdown().await;

        let kinds = buffer.kinds();
        let cooldown = kinds.iter().position(|k| *k == "cooldown_started").unwrap();
        let delivery = kinds.iter().position(|k| *k == "delivery_recorded").unwrap();
        assert!(cooldown < delivery);
    }
}
