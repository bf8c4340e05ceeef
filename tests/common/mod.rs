#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use tokio::sync::{broadcast, Mutex, Notify};

use leafwatch_lib::capture::{CameraError, CameraSource, CameraStream, CaptureTrigger, Frame};
use leafwatch_lib::classifier::{Classifier, ClassifierError, ImageUpload};
use leafwatch_lib::db::KeyValueStore;
use leafwatch_lib::events::AppEvent;
use leafwatch_lib::history::HistoryStore;
use leafwatch_lib::models::{ClassScore, HistoryEntry, PredictionResult};
use leafwatch_lib::settings::CaptureSettings;
use leafwatch_lib::AppState;

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

pub async fn app_state() -> Arc<AppState> {
    let history = HistoryStore::load(Arc::new(MemoryStore::default()), 50)
        .await
        .unwrap();
    Arc::new(AppState::new(history))
}

/// Ticks every 2s, detection starts on the tick after readiness.
pub fn fast_settings(cooldown_ms: u64) -> CaptureSettings {
    CaptureSettings {
        tick_interval_ms: 2_000,
        cooldown_ms,
        settle_delay_ms: 0,
        ..CaptureSettings::default()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Every frame has the brightness currently set on the camera.
    Still,
    /// Odd grabs are black, even grabs bright: motion on every compare.
    Flicker,
}

#[derive(Clone)]
pub struct FakeCamera {
    pub scene: Scene,
    pub brightness: Arc<AtomicU8>,
    pub deny: bool,
    /// Grabs after this many fail with `StreamLost`.
    pub lose_after: Option<usize>,
    /// Each stream fails this many readiness checks before it plays.
    pub not_ready_for: usize,
    pub ready_checks: Arc<AtomicUsize>,
    pub opens: Arc<AtomicUsize>,
    pub grabs: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            brightness: Arc::new(AtomicU8::new(0)),
            deny: false,
            lose_after: None,
            not_ready_for: 0,
            ready_checks: Arc::new(AtomicUsize::new(0)),
            opens: Arc::new(AtomicUsize::new(0)),
            grabs: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_brightness(&self, value: u8) {
        self.brightness.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl CameraSource for FakeCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.deny {
            return Err(CameraError::PermissionDenied);
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            camera: self.clone(),
            grabbed: 0,
            checks: 0,
        }))
    }
}

struct FakeStream {
    camera: FakeCamera,
    grabbed: usize,
    checks: usize,
}

#[async_trait]
impl CameraStream for FakeStream {
    async fn wait_ready(&mut self) -> Result<(), CameraError> {
        self.checks += 1;
        self.camera.ready_checks.fetch_add(1, Ordering::SeqCst);
        if self.checks <= self.camera.not_ready_for {
            return Err(CameraError::NotReady("no frames yet".into()));
        }
        Ok(())
    }

    async fn grab(&mut self) -> Result<Frame, CameraError> {
        self.grabbed += 1;
        self.camera.grabs.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.camera.lose_after {
            if self.grabbed > limit {
                return Err(CameraError::StreamLost("device unplugged".into()));
            }
        }

        let value = match self.camera.scene {
            Scene::Still => self.camera.brightness.load(Ordering::SeqCst),
            Scene::Flicker if self.grabbed % 2 == 0 => 200,
            Scene::Flicker => 0,
        };
        Ok(Frame::new(RgbImage::from_pixel(32, 24, Rgb([value, value, value]))))
    }

    async fn close(self: Box<Self>) {
        self.camera.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeClassifier {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub last_mime: std::sync::Mutex<Option<String>>,
    /// When set, each classification waits for one `notify_one`.
    pub hold: Option<Arc<Notify>>,
}

impl FakeClassifier {
    pub fn instant() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            last_mime: std::sync::Mutex::new(None),
            hold: None,
        })
    }

    pub fn held(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            last_mime: std::sync::Mutex::new(None),
            hold: Some(gate),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_mime(&self) -> Option<String> {
        self.last_mime.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, upload: ImageUpload) -> Result<PredictionResult, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime.lock().unwrap() = Some(upload.mime);

        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClassifierError::Status {
                status: 503,
                body: "model not loaded".into(),
            });
        }

        Ok(PredictionResult {
            label: "Tomato___Late_blight".into(),
            confidence: 0.93,
            per_class_scores: vec![
                ClassScore { label: "Tomato___Late_blight".into(), score: 0.93 },
                ClassScore { label: "Tomato___healthy".into(), score: 0.05 },
            ],
        })
    }

    async fn health(&self) -> bool {
        true
    }
}

pub async fn next_prediction(
    events: &mut broadcast::Receiver<AppEvent>,
) -> (CaptureTrigger, HistoryEntry) {
    loop {
        if let AppEvent::PredictionReady { trigger, entry } = events.recv().await.unwrap() {
            return (trigger, entry);
        }
    }
}
