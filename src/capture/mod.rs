//! Motion-gated capture: a periodic sampling loop over a live camera stream
//! that submits interesting frames to the classifier.

mod camera;
mod controller;
mod frame;
mod loop_worker;
mod snapshot;
mod state;
mod submit;
mod throttle;
#[cfg(feature = "camera")]
mod webcam;

pub use camera::{CameraError, CameraSource, CameraStream};
pub use controller::CaptureController;
pub use frame::{Frame, MotionDetector, MotionGate, MotionSample};
pub use snapshot::{data_url, encode_jpeg, CaptureEvent};
pub use state::ControllerState;
pub use submit::{record_prediction, SubmitError};
pub use throttle::{CaptureThrottle, SubmissionGate, SubmissionPermit};
#[cfg(feature = "camera")]
pub use webcam::WebcamSource;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What caused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureTrigger {
    Motion,
    Manual,
    Upload,
}

impl CaptureTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureTrigger::Motion => "motion",
            CaptureTrigger::Manual => "manual",
            CaptureTrigger::Upload => "upload",
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture is already running")]
    AlreadyStreaming,

    #[error("camera is not streaming")]
    NotStreaming,

    #[error("a prediction is already in progress")]
    Busy,

    #[error(transparent)]
    Camera(#[from] CameraError),
}
