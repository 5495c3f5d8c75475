use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    pub step: Duration,
    pub record: Duration,
    pub total: Duration,
}

/// Hook for capturing per-step timings from a `HeadlessRunner`.
///
/// Independent of any game State/Input types.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}

/// Discards timings; used by plain `HeadlessRunner::step`.
impl Profiler for () {}

/// Collects step timings in memory and summarizes them.
#[derive(Debug, Default, Clone)]
pub struct StepStats {
    pub steps: usize,
    pub total: Duration,
    pub slowest: Duration,
}

impl StepStats {
    pub fn mean(&self) -> Duration {
        if self.steps == 0 {
            return Duration::ZERO;
        }
        self.total / self.steps as u32
    }
}

impl Profiler for StepStats {
    fn on_step(&mut self, _frame: usize, timings: StepTimings) {
        self.steps += 1;
        self.total = self.total.saturating_add(timings.total);
        self.slowest = self.slowest.max(timings.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stats_tracks_mean_and_slowest() {
        let mut stats = StepStats::default();
        assert_eq!(stats.mean(), Duration::ZERO);

        for ms in [2, 4, 6] {
            stats.on_step(
                0,
                StepTimings {
                    total: Duration::from_millis(ms),
                    ..StepTimings::default()
                },
            );
        }

        assert_eq!(stats.steps, 3);
        assert_eq!(stats.mean(), Duration::from_millis(4));
        assert_eq!(stats.slowest, Duration::from_millis(6));
    }
}
