pub mod capture;
pub mod classifier;
pub mod cli;
mod commands;
pub mod db;
pub mod diagnosis;
pub mod events;
pub mod history;
pub mod labels;
pub mod metrics;
pub mod models;
pub mod settings;
pub mod status;
pub mod upload;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use capture::SubmissionGate;
use cli::{Cli, Command};
use events::EventBus;
use history::HistoryStore;
use metrics::MetricsCollector;
use settings::{Settings, SettingsStore, DATA_DIR_ENV};
use status::ApiStatus;

/// Process-wide state shared by the capture controller, the health poller,
/// and the command handlers.
pub struct AppState {
    pub history: HistoryStore,
    pub events: EventBus,
    /// One classifier submission at a time, whatever triggered it.
    pub submissions: SubmissionGate,
    pub metrics: MetricsCollector,
    /// Cancelled once on exit; every long-running task hangs off it.
    pub shutdown: CancellationToken,
    api_status: Arc<watch::Sender<ApiStatus>>,
}

impl AppState {
    pub fn new(history: HistoryStore) -> Self {
        let (api_status, _rx) = watch::channel(ApiStatus::Checking);
        Self {
            history,
            events: EventBus::default(),
            submissions: SubmissionGate::new(),
            metrics: MetricsCollector::new(),
            shutdown: CancellationToken::new(),
            api_status: Arc::new(api_status),
        }
    }

    pub fn api_status(&self) -> ApiStatus {
        *self.api_status.borrow()
    }

    pub fn api_status_sender(&self) -> Arc<watch::Sender<ApiStatus>> {
        Arc::clone(&self.api_status)
    }

    pub fn subscribe_api_status(&self) -> watch::Receiver<ApiStatus> {
        self.api_status.subscribe()
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG still wins for individual modules.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let data_dir = resolve_data_dir(cli.data_dir.clone());
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("settings.json"));
    let settings_store = SettingsStore::new(settings_path)?;

    let mut settings = settings_store.settings();
    settings.apply_env();
    if let Some(url) = cli.api_url.clone() {
        settings.api.api_url = url;
    }

    match cli.command {
        Command::Config(action) => commands::config(&settings_store, &action),
        Command::Status => commands::status(&settings).await,
        Command::Classify { path } => {
            let app = open_app(&data_dir, &settings).await?;
            let result = commands::classify(&app, &settings, &path).await;
            app.shutdown.cancel();
            result
        }
        Command::History(action) => {
            let app = open_app(&data_dir, &settings).await?;
            commands::history(&app, action).await
        }
        Command::Watch => {
            let app = open_app(&data_dir, &settings).await?;
            let result = commands::watch(Arc::clone(&app), &settings).await;
            app.shutdown.cancel();
            result
        }
    }
}

async fn open_app(data_dir: &Path, settings: &Settings) -> Result<Arc<AppState>> {
    log::info!("leafwatch starting, data in {}", data_dir.display());

    let database = db::Database::new(data_dir.join("leafwatch.sqlite3"))?;
    let history = HistoryStore::load(Arc::new(database), settings.history_limit).await?;
    Ok(Arc::new(AppState::new(history)))
}

/// `--data-dir`, then `LEAFWATCH_DATA_DIR`, then `~/.leafwatch`.
fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".leafwatch")
}
