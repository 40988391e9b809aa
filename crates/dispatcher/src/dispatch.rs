//! Dispatch loop
//!
//! 对单轮已过滤的目标逐个发送。严格串行：同一时刻最多一个未完成的发送。
//! 限流冷却是全局的，冷却期间不向任何目标发送。

use std::time::Duration;

use contracts::{
    BroadcastEvent, ChatProvider, DeliveryRecord, Destination, SendError, SendOutcome,
};
use events::EventBus;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::DispatchError;
use crate::pacer::{Pacer, PauseReason};

/// Seconds added on top of the provider-mandated wait
pub const COOLDOWN_MARGIN_SECS: u64 = 1;

/// Cooldown actually observed for a rate-limit signal of `wait_secs`
pub fn cooldown_for(wait_secs: u64) -> Duration {
    Duration::from_secs(wait_secs.saturating_add(COOLDOWN_MARGIN_SECS))
}

/// Result of one dispatch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// One record per attempted destination, in attempt order
    pub records: Vec<DeliveryRecord>,

    /// Destinations skipped because cancellation was observed
    pub not_attempted: Vec<Destination>,

    /// Provider wait values for every cooldown taken
    pub cooldowns: Vec<u64>,
}

impl DispatchReport {
    pub fn interrupted(&self) -> bool {
        !self.not_attempted.is_empty()
    }

    pub fn count(&self, outcome: SendOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }
}

struct Attempt {
    record: DeliveryRecord,
    cooldown: Option<u64>,
}

/// Sends one message to an ordered destination list
pub struct DispatchLoop<'a, P, Z> {
    provider: &'a P,
    pacer: &'a Z,
    events: &'a EventBus,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, P, Z> DispatchLoop<'a, P, Z>
where
    P: ChatProvider,
    Z: Pacer,
{
    pub fn new(provider: &'a P, pacer: &'a Z, events: &'a EventBus) -> Self {
        Self {
            provider,
            pacer,
            events,
            cancel: None,
        }
    }

    /// Check `token` before every destination
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|token| token.is_cancelled())
    }

    /// Attempt every destination once, in order
    ///
    /// Returns `SessionLost` as soon as the provider reports a dropped
    /// session; records gathered so far are discarded with the pass.
    #[instrument(
        name = "dispatch_once",
        skip(self, destinations, message),
        fields(destinations = destinations.len())
    )]
    pub async fn dispatch_once(
        &self,
        round: u32,
        destinations: &[Destination],
        message: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let mut report = DispatchReport::default();
        let total = destinations.len();

        for (index, destination) in destinations.iter().enumerate() {
            if self.is_cancelled() {
                warn!(
                    round,
                    remaining = total - index,
                    "Cancellation observed, stopping dispatch"
                );
                report.not_attempted = destinations[index..].to_vec();
                break;
            }

            let attempt = self.deliver(round, destination, message).await?;
            let record = attempt.record;

            if record.outcome.is_success() {
                info!(
                    round,
                    progress = format_args!("{}/{}", index + 1, total),
                    destination = %destination,
                    retried = record.retried,
                    "Message sent"
                );
            } else {
                warn!(
                    round,
                    progress = format_args!("{}/{}", index + 1, total),
                    destination = %destination,
                    outcome = %record.outcome,
                    detail = record.detail.as_deref().unwrap_or(""),
                    "Delivery failed"
                );
            }

            observability::record_delivery(record.outcome);
            self.events.publish(BroadcastEvent::DeliveryRecorded {
                round,
                destination_id: destination.id,
                title: destination.display_name.clone(),
                outcome: record.outcome,
                retried: record.retried,
                detail: record.detail.clone(),
            });

            report.cooldowns.extend(attempt.cooldown);
            report.records.push(record);
        }

        Ok(report)
    }

    async fn deliver(
        &self,
        round: u32,
        destination: &Destination,
        message: &str,
    ) -> Result<Attempt, DispatchError> {
        let first = self.provider.send_message(destination, message).await;

        let wait_secs = match first {
            Ok(()) => {
                return Ok(Attempt {
                    record: DeliveryRecord::new(destination.clone(), SendOutcome::Sent),
                    cooldown: None,
                })
            }
            Err(SendError::RateLimited { wait_secs }) => wait_secs,
            Err(other) => {
                return Ok(Attempt {
                    record: classify(destination, other)?,
                    cooldown: None,
                })
            }
        };

        let cooldown = cooldown_for(wait_secs);
        warn!(
            round,
            destination = %destination,
            wait_secs,
            cooldown_secs = cooldown.as_secs(),
            "Rate limited, pausing all sends"
        );
        observability::record_cooldown(wait_secs);
        self.events.publish(BroadcastEvent::CooldownStarted {
            round,
            destination_id: destination.id,
            wait_secs,
        });
        self.pacer.pause(cooldown, PauseReason::Cooldown).await;

        // 冷却后只重试一次，再失败即放弃该目标
        let record = match self.provider.send_message(destination, message).await {
            Ok(()) => DeliveryRecord::new(destination.clone(), SendOutcome::Sent),
            Err(SendError::Disconnected { message }) => {
                return Err(DispatchError::SessionLost {
                    destination_id: destination.id,
                    message,
                })
            }
            Err(err) => DeliveryRecord::new(destination.clone(), SendOutcome::FailedRateLimited)
                .with_detail(err.to_string()),
        };

        Ok(Attempt {
            record: record.with_retry(),
            cooldown: Some(wait_secs),
        })
    }
}

/// Map a non-rate-limit provider error onto an outcome
fn classify(destination: &Destination, err: SendError) -> Result<DeliveryRecord, DispatchError> {
    let outcome = match &err {
        SendError::PermissionDenied => SendOutcome::FailedPermission,
        SendError::AccountBanned => SendOutcome::FailedBanned,
        SendError::Other { .. } => SendOutcome::FailedOther,
        SendError::Disconnected { message } => {
            return Err(DispatchError::SessionLost {
                destination_id: destination.id,
                message: message.clone(),
            })
        }
        SendError::RateLimited { .. } => SendOutcome::FailedRateLimited,
    };
    Ok(DeliveryRecord::new(destination.clone(), outcome).with_detail(err.to_string()))
}
