use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A polled "has `period` elapsed since the last reset" timer.
///
/// Time only moves when the owner calls `advance`, so a paused session simply stops
/// advancing its cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    #[serde(with = "crate::serde_duration::nanos")]
    elapsed: Duration,
    #[serde(with = "crate::serde_duration::nanos")]
    period: Duration,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            period,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.period
    }

    /// Returns true once per elapsed period and re-arms the cooldown.
    pub fn ready(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.reset();
        true
    }
}
