//! One classifier round-trip: encode, submit, record.

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::classifier::{Classifier, ClassifierError, ImageUpload};
use crate::events::{AppEvent, Notice};
use crate::metrics::{CaptureMetrics, CaptureOutcome};
use crate::models::HistoryEntry;
use crate::AppState;

use super::{data_url, encode_jpeg, CaptureEvent, CaptureTrigger, Frame};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("could not save prediction: {0:#}")]
    History(anyhow::Error),
}

/// Sends `upload` to the classifier and, on success, prepends it to history
/// and publishes `PredictionReady`.
///
/// Returns `Ok(None)` when `teardown` was cancelled while the request was in
/// flight; the result is dropped without touching history.
pub async fn record_prediction(
    app: &AppState,
    classifier: &dyn Classifier,
    upload: ImageUpload,
    image_preview: String,
    trigger: CaptureTrigger,
    teardown: &CancellationToken,
) -> Result<Option<HistoryEntry>, SubmitError> {
    let result = classifier.classify(upload).await?;

    if teardown.is_cancelled() {
        log_info!(
            "dropping {} prediction {:?} that arrived after teardown",
            trigger.as_str(),
            result.label
        );
        return Ok(None);
    }

    let entry = app
        .history
        .record(image_preview, result)
        .await
        .map_err(SubmitError::History)?;

    log_info!(
        "{} prediction {} ({}%) recorded as {}",
        trigger.as_str(),
        entry.result.label,
        entry.result.confidence_percent(),
        entry.id
    );
    app.events.emit(AppEvent::PredictionReady {
        trigger,
        entry: entry.clone(),
    });

    Ok(Some(entry))
}

/// Capture and submit protocol for one admitted frame. Failures become
/// transient notices; nothing here can stop the sampling loop.
pub(crate) async fn submit_frame(
    app: &AppState,
    classifier: &dyn Classifier,
    frame: Frame,
    trigger: CaptureTrigger,
    jpeg_quality: u8,
    teardown: &CancellationToken,
) {
    let started = Instant::now();
    let captured_at = frame.captured_at;

    let encode_started = Instant::now();
    let image_bytes = match encode(frame, jpeg_quality).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log_error!("snapshot encoding failed: {err:#}");
            app.events
                .notice(Notice::transient(format!("Could not capture the image: {err}")));
            finish(app, trigger, started, 0, 0, 0, CaptureOutcome::Failed).await;
            return;
        }
    };
    let encode_ms = encode_started.elapsed().as_millis() as u64;

    let event = CaptureEvent {
        timestamp: captured_at,
        trigger,
        image_bytes,
    };
    let file_name = event.file_name();
    let image_preview = data_url("image/jpeg", &event.image_bytes);
    let image_len = event.image_bytes.len();
    let upload = ImageUpload::jpeg(event.image_bytes, file_name);

    let submit_started = Instant::now();
    let outcome = record_prediction(app, classifier, upload, image_preview, trigger, teardown).await;
    let submit_ms = submit_started.elapsed().as_millis() as u64;

    let outcome = match outcome {
        Ok(Some(_)) => CaptureOutcome::Recorded,
        Ok(None) => CaptureOutcome::Discarded,
        Err(err) => {
            log_warn!("{} capture failed: {err}", trigger.as_str());
            if !teardown.is_cancelled() {
                app.events
                    .notice(Notice::transient(format!("Could not analyze the image: {err}")));
            }
            CaptureOutcome::Failed
        }
    };

    finish(app, trigger, started, encode_ms, image_len, submit_ms, outcome).await;
}

async fn encode(frame: Frame, quality: u8) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_jpeg(&frame, quality))
        .await
        .context("snapshot encoder task failed")?
}

async fn finish(
    app: &AppState,
    trigger: CaptureTrigger,
    started: Instant,
    encode_ms: u64,
    image_bytes: usize,
    submit_ms: u64,
    outcome: CaptureOutcome,
) {
    let (cpu_percent, memory_mb) = app.metrics.sample_system_metrics().await;
    app.metrics
        .record_capture(CaptureMetrics {
            timestamp: Utc::now(),
            trigger,
            encode_ms,
            image_bytes,
            submit_ms,
            total_ms: started.elapsed().as_millis() as u64,
            outcome,
            cpu_percent,
            memory_mb,
        })
        .await;
}
