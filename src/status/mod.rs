//! Prediction API reachability, polled on a fixed interval.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::classifier::Classifier;
use crate::events::{AppEvent, EventBus};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiStatus {
    Checking,
    Online,
    Offline,
}

impl Default for ApiStatus {
    fn default() -> Self {
        ApiStatus::Checking
    }
}

impl ApiStatus {
    pub fn from_health(ok: bool) -> Self {
        if ok {
            ApiStatus::Online
        } else {
            ApiStatus::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Checking => "checking",
            ApiStatus::Online => "online",
            ApiStatus::Offline => "offline",
        }
    }
}

/// Runs one health check and publishes the outcome if it changed.
pub async fn check_once(
    classifier: &dyn Classifier,
    status_tx: &watch::Sender<ApiStatus>,
    events: &EventBus,
) -> ApiStatus {
    let status = ApiStatus::from_health(classifier.health().await);
    let changed = status_tx.send_if_modified(|current| {
        if *current == status {
            false
        } else {
            *current = status;
            true
        }
    });

    if changed {
        match status {
            ApiStatus::Offline => log_warn!("prediction API is offline"),
            _ => log_info!("prediction API is {}", status.as_str()),
        }
        events.emit(AppEvent::ApiStatusChanged { status });
    } else {
        log_debug!("prediction API still {}", status.as_str());
    }
    status
}

pub struct HealthMonitor {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl HealthMonitor {
    /// Checks immediately, then every `interval` until stopped or `parent` is
    /// cancelled.
    pub fn spawn(
        classifier: Arc<dyn Classifier>,
        status_tx: Arc<watch::Sender<ApiStatus>>,
        events: EventBus,
        interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let cancel_token = parent.child_token();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        log_debug!("health monitor shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = check_once(classifier.as_ref(), &status_tx, &events) => {}
                        }
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
            cancel_token,
        }
    }

    pub async fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
