use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::events::{AppEvent, EventBus};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ControllerState {
    #[default]
    Idle,
    Starting,
    Streaming,
    /// Streaming with one classifier round-trip in flight.
    Detecting,
}

impl ControllerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Starting => "starting",
            ControllerState::Streaming => "streaming",
            ControllerState::Detecting => "detecting",
        }
    }

    /// `Detecting` is a sub-state of `Streaming`.
    pub fn is_streaming(&self) -> bool {
        matches!(self, ControllerState::Streaming | ControllerState::Detecting)
    }
}

/// Shared between the controller, its loop, and in-flight submissions.
/// Every change is mirrored onto the event bus.
#[derive(Clone)]
pub(crate) struct StateHandle {
    tx: Arc<watch::Sender<ControllerState>>,
    events: EventBus,
}

impl StateHandle {
    pub fn new(events: EventBus) -> Self {
        let (tx, _rx) = watch::channel(ControllerState::Idle);
        Self {
            tx: Arc::new(tx),
            events,
        }
    }

    pub fn get(&self) -> ControllerState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.tx.subscribe()
    }

    pub fn set(&self, next: ControllerState) -> bool {
        self.update(next, |_| true)
    }

    /// Moves to `to` only if the current state is still `from`.
    pub fn transition(&self, from: ControllerState, to: ControllerState) -> bool {
        self.update(to, |current| current == from)
    }

    fn update(&self, next: ControllerState, allowed: impl Fn(ControllerState) -> bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current != next && allowed(*current) {
                *current = next;
                true
            } else {
                false
            }
        });

        if changed {
            log_debug!("capture controller -> {}", next.as_str());
            self.events
                .emit(AppEvent::ControllerStateChanged { state: next });
        }
        changed
    }
}
