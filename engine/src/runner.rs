use std::time::Instant;

use crate::GameLogic;
use crate::profiling::{Profiler, StepTimings};
use crate::timemachine::TimeMachine;

/// Steps a [`GameLogic`] without a window, keeping every frame in a [`TimeMachine`].
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    timeline: TimeMachine<G::State>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let first = game.initial_state();
        Self::from_timemachine(game, TimeMachine::new(first))
    }

    /// Continues from a loaded timeline at its current frame.
    pub fn from_timemachine(game: G, timeline: TimeMachine<G::State>) -> Self {
        Self { game, timeline }
    }

    pub fn frame(&self) -> usize {
        self.timeline.frame()
    }

    pub fn state(&self) -> &G::State {
        self.timeline.state()
    }

    pub fn timemachine(&self) -> &TimeMachine<G::State> {
        &self.timeline
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        self.step_profiled(input, &mut ())
    }

    pub fn step_profiled<P: Profiler>(&mut self, input: G::Input, profiler: &mut P) -> usize {
        let started = Instant::now();
        let next = self.game.step(self.timeline.state(), input);
        let stepped = Instant::now();
        let frame = self.timeline.record(next);
        let recorded = Instant::now();

        profiler.on_step(
            frame,
            StepTimings {
                step: stepped - started,
                record: recorded - stepped,
                total: recorded - started,
            },
        );
        frame
    }

    pub fn run(&mut self, inputs: impl IntoIterator<Item = G::Input>) -> usize {
        inputs
            .into_iter()
            .fold(self.frame(), |_, input| self.step(input))
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.timeline.rewind(frames)
    }

    pub fn seek(&mut self, frame: usize) -> usize {
        self.timeline.seek(frame)
    }
}
