//! EventBus - stamps events and fans them out to sinks

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, instrument};

use contracts::{BroadcastEvent, EventEnvelope, SinkConfig, SinkType};

use crate::error::EventError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, MemorySink};

/// Fan-out of broadcast events to every configured sink
///
/// Publishing never blocks: each sink has its own bounded queue and a full
/// queue drops the event for that sink only. A bus with no sinks is a no-op.
#[derive(Default)]
pub struct EventBus {
    handles: Vec<SinkHandle>,
    next_seq: AtomicU64,
}

impl EventBus {
    /// Bus with custom sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Bus that discards every event
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Number of attached sinks
    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.next_seq.load(Ordering::Relaxed)
    }

    /// Stamp and queue an event on every sink
    pub fn publish(&self, event: BroadcastEvent) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        if self.handles.is_empty() {
            return;
        }

        let envelope = EventEnvelope::new(seq, event);
        for handle in &self.handles {
            handle.try_send(envelope.clone());
        }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Drain every sink queue and close the sinks
    #[instrument(name = "event_bus_shutdown", skip(self), fields(sinks = self.handles.len()))]
    pub async fn shutdown(self) {
        let published = self.published();
        for handle in self.handles {
            handle.shutdown().await;
        }
        debug!(published, "EventBus shutdown complete");
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "event_bus_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, EventError> {
    match config.sink_type {
        SinkType::Log => Ok(SinkHandle::spawn(
            LogSink::new(&config.name),
            config.queue_capacity,
        )),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| EventError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Memory => Ok(SinkHandle::spawn(
            MemorySink::new(&config.name),
            config.queue_capacity,
        )),
    }
}

/// Build an EventBus from sink configs
///
/// Must be called from within a tokio runtime.
#[instrument(name = "event_bus_create", skip(sink_configs), fields(sinks = sink_configs.len()))]
pub fn create_event_bus(sink_configs: &[SinkConfig]) -> Result<EventBus, EventError> {
    let handles = sink_configs
        .iter()
        .map(create_sink_handle)
        .collect::<Result<Vec<_>, _>>()?;

    info!(sinks = handles.len(), "EventBus started");
    Ok(EventBus::with_handles(handles))
}
