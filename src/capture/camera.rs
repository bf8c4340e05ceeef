use async_trait::async_trait;
use thiserror::Error;

use super::Frame;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access was denied; check the camera permissions")]
    PermissionDenied,

    #[error("no camera device found")]
    NoDevice,

    #[error("camera stream is not ready: {0}")]
    NotReady(String),

    #[error("camera stream lost: {0}")]
    StreamLost(String),

    #[error("could not read frame: {0}")]
    Frame(String),

    #[error("camera worker failed: {0}")]
    Worker(String),
}

/// Acquires camera streams. One call to `open` is one device acquisition.
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live stream. The device is released by `close`, which consumes the
/// stream so it can only happen once.
#[async_trait]
pub trait CameraStream: Send {
    /// Resolves once frames can be read. Called again after a failure.
    async fn wait_ready(&mut self) -> Result<(), CameraError>;

    async fn grab(&mut self) -> Result<Frame, CameraError>;

    async fn close(self: Box<Self>);
}
