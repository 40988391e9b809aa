//! MemorySink - keeps events in process, for tests and summaries

use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{ContractError, EventEnvelope, EventSink};

/// Shared view of the events a `MemorySink` received
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    inner: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl EventBuffer {
    fn lock(&self) -> MutexGuard<'_, Vec<EventEnvelope>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn snapshot(&self) -> Vec<EventEnvelope> {
        self.lock().clone()
    }

    /// Event kinds in arrival order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.lock().iter().map(|e| e.event.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Sink that appends every event to an `EventBuffer`
pub struct MemorySink {
    name: String,
    buffer: EventBuffer,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: EventBuffer::default(),
        }
    }

    /// Handle that stays readable after the sink is moved into a worker
    pub fn buffer(&self) -> EventBuffer {
        self.buffer.clone()
    }
}

impl EventSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, event: &EventEnvelope) -> Result<(), ContractError> {
        self.buffer.lock().push(event.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
