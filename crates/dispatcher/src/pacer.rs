//! Pacer - the engine's only way to suspend
//!
//! Cooldowns and inter-round delays both go through a `Pacer`, so tests can
//! observe every pause without sleeping.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Why the engine is pausing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Provider-mandated rate-limit cooldown
    Cooldown,
    /// Fixed delay between rounds
    InterRound,
}

/// Suspension capability
///
/// Pauses are not cancellable once started.
#[trait_variant::make(Pacer: Send)]
pub trait LocalPacer {
    async fn pause(&self, duration: Duration, reason: PauseReason);
}

/// Real-time pacer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration, _reason: PauseReason) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Pacer that records pauses and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Arc<Mutex<Vec<(Duration, PauseReason)>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Duration, PauseReason)>> {
        self.pauses.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Every pause, in order
    pub fn pauses(&self) -> Vec<(Duration, PauseReason)> {
        self.lock().clone()
    }

    /// Pauses with the given reason, in order
    pub fn pauses_for(&self, reason: PauseReason) -> Vec<Duration> {
        self.lock()
            .iter()
            .filter(|(_, r)| *r == reason)
            .map(|(d, _)| *d)
            .collect()
    }

    /// Sum of all requested pauses
    pub fn total(&self) -> Duration {
        self.lock().iter().map(|(d, _)| *d).sum()
    }
}

impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration, reason: PauseReason) {
        self.lock().push((duration, reason));
    }
}
