use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// What an attempt was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttemptKind {
    /// Acquire and text the position.
    Send,
    /// Acquire and display only.
    Locate,
}

/// Events emitted by the dispatch controller for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchEvent {
    AttemptStarted {
        attempt: Uuid,
        mode: AttemptKind,
    },
    LocationAcquired {
        attempt: Uuid,
        latitude: f64,
        longitude: f64,
    },
    MessageSent {
        attempt: Uuid,
        destination: String,
        segments: usize,
    },
    AttemptFailed {
        attempt: Uuid,
        message: String,
    },
    SubmitRejected {
        message: String,
    },
    ResultCleared {
        automatic: bool,
    },
}

pub type EventSender = broadcast::Sender<DispatchEvent>;
pub type EventReceiver = broadcast::Receiver<DispatchEvent>;

/// Create a broadcast event bus with the given capacity.
pub fn event_bus(capacity: usize) -> (EventSender, EventReceiver) {
    broadcast::channel(capacity)
}
