use engine::GameLogic;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::input::TickInput;
use crate::session::Session;

/// Deterministic step function over [`Session`] for the engine's `HeadlessRunner`.
#[derive(Debug, Clone)]
pub struct T3drisLogic {
    config: GameConfig,
    seed: u64,
}

impl T3drisLogic {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let config = config.sanitized();
        config.validate()?;
        Ok(Self { config, seed })
    }
}

impl GameLogic for T3drisLogic {
    type State = Session;
    type Input = TickInput;

    fn initial_state(&self) -> Self::State {
        Session::from_valid(self.config.clone(), self.seed)
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        next.tick(&input);
        next
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::HeadlessRunner;

    use super::*;
    use crate::input::InputEvent;
    use crate::voxel_grid::GridSize;

    #[test]
    fn runner_rewinds_to_earlier_sessions() {
        let mut runner = HeadlessRunner::new(T3drisLogic::new(GameConfig::default(), 11).unwrap());
        runner.step(TickInput::with(Duration::ZERO, [InputEvent::TogglePause]));
        runner.step(TickInput::with(Duration::ZERO, [InputEvent::HardDrop]));
        assert!(runner.state().current().is_none());

        runner.rewind(1);
        assert!(runner.state().current().is_some());
        assert!(!runner.state().is_paused());
    }

    #[test]
    fn unplaceable_grid_is_refused() {
        let config = GameConfig {
            grid: GridSize::new(3, 21, 12),
            ..GameConfig::default()
        };
        assert!(matches!(
            T3drisLogic::new(config.clone(), 1),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Session::new(config, 1).is_err());
    }
}
