use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::classifier::Classifier;
use crate::events::Notice;
use crate::settings::CaptureSettings;
use crate::AppState;

use super::loop_worker::{capture_loop, LoopContext, ManualRequest};
use super::state::StateHandle;
use super::{CameraSource, CaptureError, ControllerState};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Drives one camera through `Idle -> Starting -> Streaming -> Idle`.
///
/// Stopping cancels the sampling loop but lets an in-flight submission land.
/// Dropping the controller is a teardown: any result still in flight is
/// discarded.
pub struct CaptureController {
    camera: Arc<dyn CameraSource>,
    ctx: LoopContext,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    manual_tx: Option<mpsc::Sender<ManualRequest>>,
}

impl CaptureController {
    pub fn new(
        camera: Arc<dyn CameraSource>,
        classifier: Arc<dyn Classifier>,
        app: Arc<AppState>,
        settings: CaptureSettings,
    ) -> Self {
        let teardown = app.shutdown.child_token();
        let state = StateHandle::new(app.events.clone());

        Self {
            camera,
            ctx: LoopContext {
                app,
                classifier,
                state,
                settings,
                teardown,
            },
            handle: None,
            cancel_token: None,
            manual_tx: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.ctx.state.get()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState> {
        self.ctx.state.subscribe()
    }

    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                return Err(CaptureError::AlreadyStreaming);
            }
            // The previous loop ended on its own (stream lost).
            self.reap().await;
        }

        self.ctx.state.set(ControllerState::Starting);
        log_info!("requesting camera stream");

        let stream = match self.camera.open().await {
            Ok(stream) => stream,
            Err(err) => {
                log_error!("camera unavailable: {err}");
                self.ctx.state.set(ControllerState::Idle);
                self.ctx.app.events.notice(Notice::blocking(format!(
                    "Could not access the camera: {err}"
                )));
                return Err(err.into());
            }
        };

        let cancel_token = self.ctx.teardown.child_token();
        let (manual_tx, manual_rx) = mpsc::channel(4);

        self.ctx.state.set(ControllerState::Streaming);
        let handle = tokio::spawn(capture_loop(
            stream,
            self.ctx.clone(),
            cancel_token.clone(),
            manual_rx,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.manual_tx = Some(manual_tx);
        Ok(())
    }

    /// Halts sampling and releases the camera. Safe to call when idle.
    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.reap().await;
        self.ctx.state.set(ControllerState::Idle);
    }

    /// Captures the current frame regardless of motion. Rejected with
    /// [`CaptureError::Busy`] while another submission is in flight.
    pub async fn capture_now(&self) -> Result<(), CaptureError> {
        let Some(manual_tx) = &self.manual_tx else {
            return Err(CaptureError::NotStreaming);
        };
        if self.ctx.app.submissions.is_busy() {
            return Err(CaptureError::Busy);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        manual_tx
            .send(ManualRequest { reply: reply_tx })
            .await
            .map_err(|_| CaptureError::NotStreaming)?;

        reply_rx.await.map_err(|_| CaptureError::NotStreaming)?
    }

    async fn reap(&mut self) {
        self.manual_tx = None;
        self.cancel_token = None;
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log_warn!("capture loop task failed to join: {err}");
            }
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.ctx.teardown.cancel();
    }
}
