//! LogSink - mirrors events into tracing

use contracts::{BroadcastEvent, ContractError, EventEnvelope, EventSink};
use tracing::{debug, info, instrument, warn};

/// Sink that logs event summaries
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event(&self, envelope: &EventEnvelope) {
        let seq = envelope.seq;
        match &envelope.event {
            BroadcastEvent::DeliveryRecorded {
                round,
                destination_id,
                title,
                outcome,
                retried,
                detail,
            } if !outcome.is_success() => {
                warn!(
                    sink = %self.name,
                    seq,
                    round,
                    destination_id = %destination_id,
                    title = %title,
                    outcome = %outcome,
                    retried,
                    detail = detail.as_deref().unwrap_or(""),
                    "delivery failed"
                );
            }
            BroadcastEvent::RoundCompleted { result } => {
                info!(
                    sink = %self.name,
                    seq,
                    round = result.round,
                    sent = result.sent,
                    failed = result.failed,
                    excluded = result.excluded,
                    "round completed"
                );
            }
            other => {
                debug!(sink = %self.name, seq, event = other.kind(), "event");
            }
        }
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, event),
        fields(sink = %self.name, seq = event.seq)
    )]
    async fn write(&mut self, event: &EventEnvelope) -> Result<(), ContractError> {
        self.log_event(event);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DestinationId, SendOutcome};

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let event = EventEnvelope::new(
            1,
            BroadcastEvent::DeliveryRecorded {
                round: 1,
                destination_id: DestinationId::new(5),
                title: "G5".into(),
                outcome: SendOutcome::FailedBanned,
                retried: false,
                detail: None,
            },
        );

        assert!(sink.write(&event).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
