use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Duration, Instant};

/// Minimum spacing between automatic captures.
#[derive(Debug, Clone)]
pub struct CaptureThrottle {
    cooldown: Duration,
    last_capture: Option<Instant>,
}

impl CaptureThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_capture: None,
        }
    }

    /// True when no capture happened yet or at least `cooldown` has passed.
    pub fn is_open(&self, now: Instant) -> bool {
        self.last_capture
            .map(|last| now.saturating_duration_since(last) >= self.cooldown)
            .unwrap_or(true)
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_capture = Some(now);
    }

    pub fn last_capture(&self) -> Option<Instant> {
        self.last_capture
    }
}

/// Admits at most one classifier submission at a time, across every path
/// that submits (motion, manual capture, file upload).
#[derive(Clone)]
pub struct SubmissionGate {
    permits: Arc<Semaphore>,
}

/// Held for the lifetime of one submission; dropping it reopens the gate.
pub struct SubmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Never waits: `None` means a submission is already in flight.
    pub fn try_begin(&self) -> Option<SubmissionPermit> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .ok()
            .map(|permit| SubmissionPermit { _permit: permit })
    }

    pub fn is_busy(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new()
    }
}
