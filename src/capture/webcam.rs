//! nokhwa-backed webcam. The device lives on its own thread because the
//! capture handle is blocking and not guaranteed to be `Send`.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use image::RgbImage;
use log::{error, info};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use tokio::sync::oneshot;

use super::camera::{CameraError, CameraSource, CameraStream};
use super::Frame;
use crate::settings::CaptureSettings;

enum CameraCommand {
    Grab(oneshot::Sender<Result<Frame, CameraError>>),
    Shutdown,
}

pub struct WebcamSource {
    index: u32,
    width: u32,
    height: u32,
}

impl WebcamSource {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            index: settings.camera_index,
            width: settings.capture_width,
            height: settings.capture_height,
        }
    }
}

#[async_trait]
impl CameraSource for WebcamSource {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        let (command_tx, command_rx) = mpsc::channel::<CameraCommand>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (index, width, height) = (self.index, self.width, self.height);

        let worker = thread::Builder::new()
            .name("leafwatch-camera".into())
            .spawn(move || camera_thread(index, width, height, ready_tx, command_rx))
            .map_err(|err| CameraError::Worker(err.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Box::new(WebcamStream {
                sender: command_tx,
                worker: Some(worker),
            })),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => {
                let _ = worker.join();
                Err(CameraError::Worker(
                    "camera thread exited before opening the device".into(),
                ))
            }
        }
    }
}

fn camera_thread(
    index: u32,
    width: u32,
    height: u32,
    ready_tx: oneshot::Sender<Result<(), CameraError>>,
    command_rx: mpsc::Receiver<CameraCommand>,
) {
    let mut camera = match open_camera(index, width, height) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    if ready_tx.send(Ok(())).is_err() {
        error!("camera opener dropped before the device was ready");
        let _ = camera.stop_stream();
        return;
    }

    while let Ok(command) = command_rx.recv() {
        match command {
            CameraCommand::Grab(reply) => {
                let _ = reply.send(read_frame(&mut camera));
            }
            CameraCommand::Shutdown => break,
        }
    }

    if let Err(err) = camera.stop_stream() {
        error!("Failed to stop camera stream: {err}");
    }
    info!("Camera {index} released");
}

fn open_camera(index: u32, width: u32, height: u32) -> Result<Camera, CameraError> {
    let devices = nokhwa::query(ApiBackend::Auto).map_err(|err| classify_open_error(&err.to_string()))?;
    if devices.is_empty() {
        return Err(CameraError::NoDevice);
    }

    info!("Opening camera {index} at {width}x{height}");
    let format = CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, 30);
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

    let mut camera = Camera::new(CameraIndex::Index(index), requested)
        .map_err(|err| classify_open_error(&err.to_string()))?;
    camera
        .open_stream()
        .map_err(|err| classify_open_error(&err.to_string()))?;

    Ok(camera)
}

fn read_frame(camera: &mut Camera) -> Result<Frame, CameraError> {
    let buffer = camera
        .frame()
        .map_err(|err| CameraError::StreamLost(err.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|err| CameraError::Frame(err.to_string()))?;

    let (w, h) = (decoded.width(), decoded.height());
    let image = RgbImage::from_raw(w, h, decoded.into_raw())
        .ok_or_else(|| CameraError::Frame(format!("short frame buffer for {w}x{h}")))?;
    Ok(Frame::new(image))
}

fn classify_open_error(message: &str) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CameraError::PermissionDenied
    } else if lower.contains("no such device") || lower.contains("not found") {
        CameraError::NoDevice
    } else {
        CameraError::NotReady(message.to_string())
    }
}

struct WebcamStream {
    sender: mpsc::Sender<CameraCommand>,
    worker: Option<JoinHandle<()>>,
}

impl WebcamStream {
    async fn request_frame(&self) -> Result<Frame, CameraError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(CameraCommand::Grab(reply_tx))
            .map_err(|_| CameraError::StreamLost("camera thread stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| CameraError::StreamLost("camera thread dropped the request".into()))?
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = self.sender.send(CameraCommand::Shutdown);
            if let Err(join_err) = handle.join() {
                error!("Failed to join camera thread: {join_err:?}");
            }
        }
    }
}

#[async_trait]
impl CameraStream for WebcamStream {
    async fn wait_ready(&mut self) -> Result<(), CameraError> {
        self.request_frame()
            .await
            .map(|_| ())
            .map_err(|err| CameraError::NotReady(err.to_string()))
    }

    async fn grab(&mut self) -> Result<Frame, CameraError> {
        self.request_frame().await
    }

    async fn close(mut self: Box<Self>) {
        if let Err(err) = tokio::task::spawn_blocking(move || self.shutdown()).await {
            error!("camera release task failed: {err}");
        }
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}
