use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "LEAFWATCH_API_URL";
pub const DATA_DIR_ENV: &str = "LEAFWATCH_DATA_DIR";

/// Classifier endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiSettings {
    pub api_url: String,
    pub predict_path: String,
    pub health_path: String,
    pub request_timeout_ms: u64,
    pub health_interval_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            predict_path: "/predict".into(),
            health_path: "/health".into(),
            request_timeout_ms: 30_000,
            health_interval_ms: 10_000,
        }
    }
}

impl ApiSettings {
    pub fn predict_url(&self) -> String {
        join_url(&self.api_url, &self.predict_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.api_url, &self.health_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Never zero; timers reject an empty period.
    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms.max(1))
    }
}

/// Motion gate and capture loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureSettings {
    pub tick_interval_ms: u64,
    pub cooldown_ms: u64,
    pub settle_delay_ms: u64,
    pub pixel_stride: usize,
    pub pixel_change_threshold: u32,
    pub average_delta_threshold: f64,
    pub changed_ratio_threshold: f64,
    pub jpeg_quality: u8,
    pub camera_index: u32,
    pub capture_width: u32,
    pub capture_height: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            cooldown_ms: 2_000,
            settle_delay_ms: 1_000,
            pixel_stride: 20,
            pixel_change_threshold: 30,
            average_delta_threshold: 15.0,
            changed_ratio_threshold: 0.05,
            jpeg_quality: 80,
            camera_index: 0,
            capture_width: 1280,
            capture_height: 720,
        }
    }
}

impl CaptureSettings {
    /// Never zero; timers reject an empty period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub api: ApiSettings,
    pub capture: CaptureSettings,
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            capture: CaptureSettings::default(),
            history_limit: crate::history::MAX_HISTORY_ENTRIES,
        }
    }
}

impl Settings {
    /// Applies `LEAFWATCH_API_URL` on top of whatever the file provided.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.api.api_url = url.to_string();
            }
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    /// Loads `path` if it exists. Unreadable JSON falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring malformed settings file {}: {err}",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_api_url(&self, api_url: String) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.api.api_url = api_url;
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
