use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::classifier::Classifier;
use crate::events::Notice;
use crate::metrics::SuppressReason;
use crate::settings::CaptureSettings;
use crate::AppState;

use super::state::StateHandle;
use super::submit::submit_frame;
use super::{
    CameraError, CameraStream, CaptureError, CaptureThrottle, CaptureTrigger, ControllerState,
    Frame, MotionDetector, MotionGate, SubmissionPermit,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub(crate) struct ManualRequest {
    pub reply: oneshot::Sender<Result<(), CaptureError>>,
}

/// Everything a running loop and its submissions share.
#[derive(Clone)]
pub(crate) struct LoopContext {
    pub app: Arc<AppState>,
    pub classifier: Arc<dyn Classifier>,
    pub state: StateHandle,
    pub settings: CaptureSettings,
    /// Cancelled when the controller is torn down; late results are dropped.
    pub teardown: CancellationToken,
}

#[derive(Debug, Clone, Copy)]
enum Readiness {
    Pending,
    Settling(Instant),
    Ready,
}

/// Owns the stream, the previous frame, and the cooldown clock until
/// `cancel` fires or the stream is lost. Every exit path releases the
/// camera and returns the controller to `Idle`.
pub(crate) async fn capture_loop(
    mut stream: Box<dyn CameraStream>,
    ctx: LoopContext,
    cancel: CancellationToken,
    mut manual_rx: mpsc::Receiver<ManualRequest>,
) {
    let mut ticker = tokio::time::interval(ctx.settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut detector = MotionDetector::new(MotionGate::from(&ctx.settings));
    let mut throttle = CaptureThrottle::new(ctx.settings.cooldown());
    let mut readiness = Readiness::Pending;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log_info!("capture loop shutting down");
                break;
            }
            Some(request) = manual_rx.recv() => {
                let reply = tokio::select! {
                    _ = cancel.cancelled() => Err(CaptureError::NotStreaming),
                    reply = manual_capture(stream.as_mut(), &ctx, readiness) => reply,
                };
                let lost = matches!(reply, Err(CaptureError::Camera(CameraError::StreamLost(_))));
                let _ = request.reply.send(reply);
                if lost {
                    ctx.app.events.notice(Notice::blocking("The camera stream was lost"));
                    break;
                }
            }
            _ = ticker.tick() => {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => break,
                    outcome = sample_tick(
                        stream.as_mut(),
                        &ctx,
                        &mut detector,
                        &mut throttle,
                        &mut readiness,
                    ) => outcome,
                };

                match outcome {
                    Ok(()) => {}
                    Err(CameraError::StreamLost(reason)) => {
                        log_error!("camera stream lost: {reason}");
                        ctx.app.events.notice(Notice::blocking(format!(
                            "The camera stream was lost: {reason}"
                        )));
                        break;
                    }
                    Err(err) => log_warn!("sampling tick failed: {err}"),
                }
            }
        }
    }

    stream.close().await;
    detector.reset();
    ctx.state.set(ControllerState::Idle);
    log_info!("camera released");
}

async fn sample_tick(
    stream: &mut dyn CameraStream,
    ctx: &LoopContext,
    detector: &mut MotionDetector,
    throttle: &mut CaptureThrottle,
    readiness: &mut Readiness,
) -> Result<(), CameraError> {
    match *readiness {
        Readiness::Pending => {
            match stream.wait_ready().await {
                Ok(()) => {
                    let settle = ctx.settings.settle_delay();
                    log_info!("camera ready, detection starts in {}ms", settle.as_millis());
                    *readiness = Readiness::Settling(Instant::now() + settle);
                }
                Err(CameraError::StreamLost(reason)) => return Err(CameraError::StreamLost(reason)),
                Err(err) => log_warn!("camera not ready yet: {err}"),
            }
            return Ok(());
        }
        Readiness::Settling(until) => {
            if Instant::now() < until {
                return Ok(());
            }
            *readiness = Readiness::Ready;
        }
        Readiness::Ready => {}
    }

    let frame = stream.grab().await?;

    let Some(sample) = detector.observe(&frame) else {
        log_debug!("stored reference frame {:?}", frame.dimensions());
        return Ok(());
    };

    if !detector.gate().is_motion(&sample) {
        log_debug!(
            "no motion (avg delta {:.1}, changed {:.3})",
            sample.average_channel_delta,
            sample.changed_pixel_ratio
        );
        return Ok(());
    }

    ctx.app.metrics.note_motion().await;

    let now = Instant::now();
    if !throttle.is_open(now) {
        log_debug!("motion suppressed by cooldown");
        ctx.app.metrics.note_suppressed(SuppressReason::Cooldown).await;
        return Ok(());
    }

    let Some(permit) = ctx.app.submissions.try_begin() else {
        log_debug!("motion suppressed, a submission is in flight");
        ctx.app.metrics.note_suppressed(SuppressReason::Busy).await;
        return Ok(());
    };

    log_info!(
        "motion detected (avg delta {:.1}, changed {:.3}), capturing",
        sample.average_channel_delta,
        sample.changed_pixel_ratio
    );
    throttle.mark(now);
    spawn_submission(ctx, frame, CaptureTrigger::Motion, permit);
    Ok(())
}

async fn manual_capture(
    stream: &mut dyn CameraStream,
    ctx: &LoopContext,
    readiness: Readiness,
) -> Result<(), CaptureError> {
    if matches!(readiness, Readiness::Pending) {
        return Err(CameraError::NotReady("camera is still starting".into()).into());
    }

    let permit = ctx.app.submissions.try_begin().ok_or(CaptureError::Busy)?;
    let frame = stream.grab().await?;

    log_info!("manual capture requested");
    spawn_submission(ctx, frame, CaptureTrigger::Manual, permit);
    Ok(())
}

/// Runs the submission detached so the next ticks keep sampling. The permit
/// is released before the state returns to `Streaming`.
fn spawn_submission(
    ctx: &LoopContext,
    frame: Frame,
    trigger: CaptureTrigger,
    permit: SubmissionPermit,
) {
    ctx.state
        .transition(ControllerState::Streaming, ControllerState::Detecting);

    let ctx = ctx.clone();
    tokio::spawn(async move {
        submit_frame(
            &ctx.app,
            ctx.classifier.as_ref(),
            frame,
            trigger,
            ctx.settings.jpeg_quality,
            &ctx.teardown,
        )
        .await;

        drop(permit);
        ctx.state
            .transition(ControllerState::Detecting, ControllerState::Streaming);
    });
}
