use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    MoveForward,
    MoveBack,
    RotateCw,
    RotateCcw,
    HardDrop,
    TogglePause,
    Restart,
    ToggleProjectionMode,
}

impl InputEvent {
    /// Events that act on the session rather than the falling piece.
    pub fn is_session_event(self) -> bool {
        matches!(
            self,
            InputEvent::TogglePause | InputEvent::Restart | InputEvent::ToggleProjectionMode
        )
    }
}

/// Everything one simulation tick consumes: elapsed time and the events that arrived
/// since the previous tick, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickInput {
    #[serde(with = "crate::serde_duration::nanos")]
    pub dt: Duration,
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn idle(dt: Duration) -> Self {
        Self {
            dt,
            events: Vec::new(),
        }
    }

    pub fn with(dt: Duration, events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            dt,
            events: events.into_iter().collect(),
        }
    }

    pub fn contains(&self, event: InputEvent) -> bool {
        self.events.contains(&event)
    }
}
