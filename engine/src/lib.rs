pub mod profiling;
pub mod regression;
mod runner;
mod timemachine;

pub use runner::HeadlessRunner;
pub use timemachine::TimeMachine;

/// A deterministic simulation: the same state and input always produce the same
/// next state.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}
