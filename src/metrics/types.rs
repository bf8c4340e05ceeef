use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureTrigger;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CaptureOutcome {
    /// Classified and written to history.
    Recorded,
    /// Encoding, submission, or persistence failed.
    Failed,
    /// Classified after the controller was torn down; result dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SuppressReason {
    Cooldown,
    Busy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetrics {
    pub timestamp: DateTime<Utc>,
    pub trigger: CaptureTrigger,
    pub encode_ms: u64,
    pub image_bytes: usize,
    pub submit_ms: u64,
    pub total_ms: u64,
    pub outcome: CaptureOutcome,
    pub cpu_percent: f32,
    pub memory_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu_percent: f32,
    pub memory_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub system: SystemMetrics,
    pub recent_captures: Vec<CaptureMetrics>,
    pub capture_count: u64,
    pub failure_count: u64,
    pub motion_ticks: u64,
    pub cooldown_suppressed: u64,
    pub busy_suppressed: u64,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            system: SystemMetrics {
                cpu_percent: 0.0,
                memory_mb: 0.0,
            },
            recent_captures: Vec::new(),
            capture_count: 0,
            failure_count: 0,
            motion_ticks: 0,
            cooldown_suppressed: 0,
            busy_suppressed: 0,
        }
    }
}

impl MetricsSnapshot {
    /// One-paragraph summary printed when `watch` exits.
    pub fn summary(&self) -> String {
        let avg_submit_ms = if self.recent_captures.is_empty() {
            0.0
        } else {
            self.recent_captures
                .iter()
                .map(|c| c.submit_ms as f64)
                .sum::<f64>()
                / self.recent_captures.len() as f64
        };

        format!(
            "captures={} failures={} motion_ticks={} suppressed(cooldown={}, busy={}) avg_submit={:.0}ms cpu={:.1}% mem={:.1}MB",
            self.capture_count,
            self.failure_count,
            self.motion_ticks,
            self.cooldown_suppressed,
            self.busy_suppressed,
            avg_submit_ms,
            self.system.cpu_percent,
            self.system.memory_mb,
        )
    }
}
