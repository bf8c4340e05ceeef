mod types;

pub use types::{CaptureMetrics, CaptureOutcome, MetricsSnapshot, SuppressReason, SystemMetrics};

use std::sync::Arc;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::Mutex;

const MAX_RECENT_CAPTURES: usize = 20;

pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

struct MetricsState {
    recent_captures: Vec<CaptureMetrics>,
    capture_count: u64,
    failure_count: u64,
    motion_ticks: u64,
    cooldown_suppressed: u64,
    busy_suppressed: u64,
    system: System,
    pid: Pid,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        let pid = Pid::from_u32(std::process::id());

        // CPU usage is a delta between refreshes, so take a baseline now.
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        Self {
            inner: Arc::new(Mutex::new(MetricsState {
                recent_captures: Vec::with_capacity(MAX_RECENT_CAPTURES),
                capture_count: 0,
                failure_count: 0,
                motion_ticks: 0,
                cooldown_suppressed: 0,
                busy_suppressed: 0,
                system,
                pid,
            })),
        }
    }

    /// Current process CPU percent and resident memory in MB.
    pub async fn sample_system_metrics(&self) -> (f32, f64) {
        let mut state = self.inner.lock().await;
        let pid = state.pid;
        state.system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        if let Some(process) = state.system.process(pid) {
            (
                process.cpu_usage(),
                process.memory() as f64 / 1024.0 / 1024.0,
            )
        } else {
            (0.0, 0.0)
        }
    }

    pub async fn record_capture(&self, metrics: CaptureMetrics) {
        let mut state = self.inner.lock().await;

        state.capture_count += 1;
        if metrics.outcome == CaptureOutcome::Failed {
            state.failure_count += 1;
        }

        state.recent_captures.push(metrics);
        if state.recent_captures.len() > MAX_RECENT_CAPTURES {
            state.recent_captures.remove(0);
        }
    }

    pub async fn note_motion(&self) {
        self.inner.lock().await.motion_ticks += 1;
    }

    pub async fn note_suppressed(&self, reason: SuppressReason) {
        let mut state = self.inner.lock().await;
        match reason {
            SuppressReason::Cooldown => state.cooldown_suppressed += 1,
            SuppressReason::Busy => state.busy_suppressed += 1,
        }
    }

    pub async fn get_snapshot(&self) -> MetricsSnapshot {
        let mut state = self.inner.lock().await;
        let pid = state.pid;
        state.system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        let system_metrics = if let Some(process) = state.system.process(pid) {
            SystemMetrics {
                cpu_percent: process.cpu_usage(),
                memory_mb: process.memory() as f64 / 1024.0 / 1024.0,
            }
        } else {
            SystemMetrics {
                cpu_percent: 0.0,
                memory_mb: 0.0,
            }
        };

        MetricsSnapshot {
            system: system_metrics,
            recent_captures: state.recent_captures.clone(),
            capture_count: state.capture_count,
            failure_count: state.failure_count,
            motion_ticks: state.motion_ticks,
            cooldown_suppressed: state.cooldown_suppressed,
            busy_suppressed: state.busy_suppressed,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MetricsCollector {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
