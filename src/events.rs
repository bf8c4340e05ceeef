use serde::Serialize;
use tokio::sync::broadcast;

use crate::capture::{CaptureTrigger, ControllerState};
use crate::models::HistoryEntry;
use crate::status::ApiStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeSeverity {
    /// The requested operation could not happen at all (camera unavailable).
    Blocking,
    /// Something failed but the loop carries on (one submission failed).
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Blocking,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Transient,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    PredictionReady {
        trigger: CaptureTrigger,
        entry: HistoryEntry,
    },
    Notice(Notice),
    ControllerStateChanged {
        state: ControllerState,
    },
    ApiStatusChanged {
        status: ApiStatus,
    },
}

/// Fan-out of [`AppEvent`]s to whichever front end is attached. Sending with
/// no subscribers is not an error.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn notice(&self, notice: Notice) {
        self.emit(AppEvent::Notice(notice));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
