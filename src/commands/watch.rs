use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::capture::{CameraSource, CaptureController};
use crate::classifier::{Classifier, HttpClassifier};
use crate::diagnosis::Diagnosis;
use crate::events::{AppEvent, NoticeSeverity};
use crate::history::{rotate, Direction};
use crate::settings::Settings;
use crate::status::{ApiStatus, HealthMonitor};
use crate::AppState;

use super::print_entry;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const HELP: &str =
    "commands: c = capture, r = restart camera, s = status, [ / ] = browse history, q = quit";

/// One line typed during a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Nothing,
    Capture,
    Restart,
    Status,
    Browse(Direction),
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Input::Nothing,
            "c" | "capture" => Input::Capture,
            "r" | "start" | "restart" => Input::Restart,
            "s" | "status" => Input::Status,
            "[" => Input::Browse(Direction::Left),
            "]" => Input::Browse(Direction::Right),
            "q" | "quit" => Input::Quit,
            other => Input::Unknown(other.to_string()),
        }
    }
}

/// Interactive camera session. Returns once the user quits or Ctrl+C is
/// pressed; the camera is released before returning.
pub(crate) async fn watch(app: Arc<AppState>, settings: &Settings) -> Result<()> {
    let classifier: Arc<dyn Classifier> = Arc::new(HttpClassifier::new(&settings.api)?);
    let camera = camera_source(settings)?;
    let mut events = app.events.subscribe();

    let mut monitor = HealthMonitor::spawn(
        Arc::clone(&classifier),
        app.api_status_sender(),
        app.events.clone(),
        settings.api.health_interval(),
        &app.shutdown,
    );

    let mut controller = CaptureController::new(
        camera,
        classifier,
        Arc::clone(&app),
        settings.capture.clone(),
    );
    if let Err(err) = controller.start().await {
        monitor.stop().await;
        return Err(err).context("could not start the camera");
    }

    println!("watching for leaves; {HELP}");

    let mut input = spawn_stdin_reader();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stdin_open = true;
    let mut cursor = 0usize;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = input.recv(), if stdin_open => {
                let Some(line) = line else {
                    log_debug!("stdin closed; Ctrl+C stops the session");
                    stdin_open = false;
                    continue;
                };
                match Input::parse(&line) {
                    Input::Nothing => {}
                    Input::Capture => match controller.capture_now().await {
                        Ok(()) => println!("capturing..."),
                        Err(err) => println!("capture rejected: {err}"),
                    },
                    Input::Restart => match controller.start().await {
                        Ok(()) => println!("camera started"),
                        Err(err) => println!("could not start the camera: {err}"),
                    },
                    Input::Status => println!(
                        "camera: {}  api: {}  history: {} entries",
                        controller.state().as_str(),
                        app.api_status().as_str(),
                        app.history.len().await
                    ),
                    Input::Browse(direction) => {
                        let entries = app.history.entries().await;
                        if entries.is_empty() {
                            println!("no predictions yet");
                        } else {
                            cursor = rotate(cursor, entries.len(), direction);
                            println!("[{}/{}]", cursor + 1, entries.len());
                            print_entry(&entries[cursor]);
                        }
                    }
                    Input::Quit => break,
                    Input::Unknown(other) => println!("unknown command {other:?}; {HELP}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let AppEvent::PredictionReady { .. } = event {
                        cursor = 0;
                    }
                    print_event(&event, settings);
                }
                Err(RecvError::Lagged(skipped)) => log_warn!("missed {skipped} events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    log_info!("stopping watch session");
    controller.stop().await;
    monitor.stop().await;

    let snapshot = app.metrics.get_snapshot().await;
    println!("{}", snapshot.summary());
    Ok(())
}

fn print_event(event: &AppEvent, settings: &Settings) {
    match event {
        AppEvent::PredictionReady { trigger, entry } => {
            println!("\n[{}] {}", trigger.as_str(), entry.id);
            print!("{}", Diagnosis::from_result(&entry.result).render());
        }
        AppEvent::Notice(notice) => match notice.severity {
            NoticeSeverity::Blocking => eprintln!("error: {}", notice.message),
            NoticeSeverity::Transient => eprintln!("warning: {}", notice.message),
        },
        AppEvent::ApiStatusChanged { status } => match status {
            ApiStatus::Online => println!("prediction API online"),
            ApiStatus::Offline => eprintln!(
                "prediction API offline; make sure the backend is running at {}",
                settings.api.api_url
            ),
            ApiStatus::Checking => {}
        },
        AppEvent::ControllerStateChanged { state } => {
            log_debug!("controller state: {}", state.as_str());
        }
    }
}

/// Blocking stdin lives on its own thread so quitting never waits on a
/// pending read.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("leafwatch-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(err) = spawned {
        log_warn!("interactive commands unavailable: {err}");
    }
    rx
}

#[cfg(feature = "camera")]
fn camera_source(settings: &Settings) -> Result<Arc<dyn CameraSource>> {
    Ok(Arc::new(crate::capture::WebcamSource::new(&settings.capture)))
}

#[cfg(not(feature = "camera"))]
fn camera_source(_settings: &Settings) -> Result<Arc<dyn CameraSource>> {
    anyhow::bail!(
        "this build has no camera support; rebuild with `--features camera` or use `leafwatch classify <image>`"
    )
}
