use std::time::Duration;

use crate::input::{InputEvent, TickInput};
use crate::rng::Rng;

const STEERING: [InputEvent; 6] = [
    InputEvent::MoveLeft,
    InputEvent::MoveRight,
    InputEvent::MoveForward,
    InputEvent::MoveBack,
    InputEvent::RotateCw,
    InputEvent::RotateCcw,
];

/// Seeded stream of tick inputs for headless runs: a steering event every few ticks
/// and a hard drop at a fixed cadence.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Rng,
    dt: Duration,
    tick: u64,
    steer_every: u64,
    drop_every: u64,
}

impl Autopilot {
    pub fn new(seed: u64, dt: Duration) -> Self {
        Self {
            rng: Rng::new(seed ^ 0xA5A5_A5A5),
            dt,
            tick: 0,
            steer_every: 3,
            drop_every: 24,
        }
    }

    pub fn with_cadence(mut self, steer_every: u64, drop_every: u64) -> Self {
        self.steer_every = steer_every.max(1);
        self.drop_every = drop_every.max(1);
        self
    }
}

impl Iterator for Autopilot {
    type Item = TickInput;

    fn next(&mut self) -> Option<Self::Item> {
        self.tick += 1;
        let mut events = Vec::new();
        if self.tick % self.steer_every == 0 {
            events.push(STEERING[self.rng.below(STEERING.len())]);
        }
        if self.tick % self.drop_every == 0 {
            events.push(InputEvent::HardDrop);
        }
        Some(TickInput::with(self.dt, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_seeded() {
        let a: Vec<_> = Autopilot::new(3, Duration::from_millis(16)).take(100).collect();
        let b: Vec<_> = Autopilot::new(3, Duration::from_millis(16)).take(100).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn cadence_controls_drops() {
        let inputs: Vec<_> = Autopilot::new(1, Duration::from_millis(10))
            .with_cadence(1000, 5)
            .take(20)
            .collect();
        let drops = inputs
            .iter()
            .filter(|input| input.contains(InputEvent::HardDrop))
            .count();
        assert_eq!(drops, 4);
        assert!(inputs.iter().all(|input| input.dt == Duration::from_millis(10)));
        assert!(inputs.iter().all(|input| !input.events.iter().any(|e| e.is_session_event())));
    }
}
