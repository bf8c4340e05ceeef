//! Classifying an image file picked by the user.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tokio::time::Instant;

use crate::capture::{data_url, record_prediction, CaptureError, CaptureTrigger};
use crate::classifier::{Classifier, ImageUpload};
use crate::metrics::{CaptureMetrics, CaptureOutcome};
use crate::models::HistoryEntry;
use crate::AppState;

/// Reads `path`, rejects anything that is not an image, and submits it under
/// the same one-at-a-time rule as camera captures.
pub async fn classify_file(
    app: &AppState,
    classifier: &dyn Classifier,
    path: &Path,
) -> Result<HistoryEntry> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let upload = ImageUpload::sniffed(bytes, file_name)?;
    let permit = app.submissions.try_begin().ok_or(CaptureError::Busy)?;

    let started = Instant::now();
    let image_bytes = upload.bytes.len();
    let image_preview = data_url(&upload.mime, &upload.bytes);
    let outcome = record_prediction(
        app,
        classifier,
        upload,
        image_preview,
        CaptureTrigger::Upload,
        &app.shutdown,
    )
    .await;
    drop(permit);

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let (cpu_percent, memory_mb) = app.metrics.sample_system_metrics().await;
    app.metrics
        .record_capture(CaptureMetrics {
            timestamp: Utc::now(),
            trigger: CaptureTrigger::Upload,
            encode_ms: 0,
            image_bytes,
            submit_ms: elapsed_ms,
            total_ms: elapsed_ms,
            outcome: match &outcome {
                Ok(Some(_)) => CaptureOutcome::Recorded,
                Ok(None) => CaptureOutcome::Discarded,
                Err(_) => CaptureOutcome::Failed,
            },
            cpu_percent,
            memory_mb,
        })
        .await;

    outcome?.ok_or_else(|| anyhow!("shutting down; prediction discarded"))
}
