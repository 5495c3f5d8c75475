use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cooldown::Cooldown;
use crate::voxel_grid::{Cell, Vec3i, VoxelGrid};

pub const CLEAR_DELAY_MS_DEFAULT: u64 = 300;

/// A full horizontal run of interior cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ClearLine {
    /// Every interior `z` at a fixed `(x, y)`.
    AlongZ { x: i32, y: i32 },
    /// Every interior `x` at a fixed `(y, z)`.
    AlongX { y: i32, z: i32 },
}

impl ClearLine {
    fn cells(self, grid: &VoxelGrid) -> Vec<Vec3i> {
        let size = grid.size();
        match self {
            ClearLine::AlongZ { x, y } => (1..size.z as i32 - 1)
                .map(|z| Vec3i::new(x, y, z))
                .collect(),
            ClearLine::AlongX { y, z } => (1..size.x as i32 - 1)
                .map(|x| Vec3i::new(x, y, z))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearState {
    Idle,
    PendingClear,
    Collapsing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
enum ClearPhase {
    #[default]
    Idle,
    Pending {
        lines: Vec<ClearLine>,
        delay: Cooldown,
    },
    Collapsing {
        lines: Vec<ClearLine>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseReport {
    pub lines: usize,
    pub score: u32,
}

/// Detects full lines after a lock, marks them, and collapses them once the
/// delay has elapsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineClearEngine {
    phase: ClearPhase,
    #[serde(with = "crate::serde_duration::nanos")]
    delay: Duration,
    lines_cleared: u32,
}

impl Default for LineClearEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(CLEAR_DELAY_MS_DEFAULT))
    }
}

impl LineClearEngine {
    pub fn new(delay: Duration) -> Self {
        Self {
            phase: ClearPhase::Idle,
            delay,
            lines_cleared: 0,
        }
    }

    pub fn state(&self) -> ClearState {
        match self.phase {
            ClearPhase::Idle => ClearState::Idle,
            ClearPhase::Pending { .. } => ClearState::PendingClear,
            ClearPhase::Collapsing { .. } => ClearState::Collapsing,
        }
    }

    pub fn pending_lines(&self) -> &[ClearLine] {
        match &self.phase {
            ClearPhase::Pending { lines, .. } | ClearPhase::Collapsing { lines } => lines,
            ClearPhase::Idle => &[],
        }
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn reset(&mut self) {
        self.phase = ClearPhase::Idle;
    }

    /// Checks the line along z and the line along x through `at`. Each full line is
    /// marked with `Cell::ClearPending` and (re)arms the collapse delay.
    ///
    /// Marked cells still count as occupied, so a line crossing an already marked one
    /// is detected too. Returns whether this call armed anything.
    pub fn check(&mut self, grid: &mut VoxelGrid, at: Vec3i) -> bool {
        let mut armed = false;
        for line in [
            ClearLine::AlongZ { x: at.x, y: at.y },
            ClearLine::AlongX { y: at.y, z: at.z },
        ] {
            if self.pending_lines().contains(&line) || !Self::is_full(grid, line) {
                continue;
            }
            for p in line.cells(grid) {
                grid.set(p, Some(Cell::ClearPending));
            }
            self.arm(line);
            armed = true;
        }
        armed
    }

    fn is_full(grid: &VoxelGrid, line: ClearLine) -> bool {
        let cells = line.cells(grid);
        !cells.is_empty()
            && cells
                .iter()
                .all(|&p| grid.in_play_volume(p) && grid.is_occupied(p))
    }

    fn arm(&mut self, line: ClearLine) {
        log::debug!("line marked for clearing: {line:?}");
        match &mut self.phase {
            ClearPhase::Pending { lines, delay } => {
                lines.push(line);
                delay.reset();
            }
            phase => {
                *phase = ClearPhase::Pending {
                    lines: vec![line],
                    delay: Cooldown::new(self.delay),
                };
            }
        }
    }

    /// Advances the collapse delay; collapses the marked lines once it expires.
    pub fn advance(&mut self, grid: &mut VoxelGrid, dt: Duration) -> Option<CollapseReport> {
        let ClearPhase::Pending { lines, delay } = &mut self.phase else {
            return None;
        };
        delay.advance(dt);
        if !delay.ready() {
            return None;
        }
        let lines = std::mem::take(lines);
        self.phase = ClearPhase::Collapsing { lines };
        Some(self.collapse(grid))
    }

    /// Shifts every column down over its marked cells and scores the pass as the
    /// square of the number of lines removed.
    pub fn collapse(&mut self, grid: &mut VoxelGrid) -> CollapseReport {
        let lines = match std::mem::take(&mut self.phase) {
            ClearPhase::Pending { lines, .. } | ClearPhase::Collapsing { lines } => lines,
            ClearPhase::Idle => Vec::new(),
        };

        let size = grid.size();
        let height = size.y as i32;
        let mut shifts = 0usize;
        for x in 1..size.x as i32 - 1 {
            for z in 1..size.z as i32 - 1 {
                for y in 1..height - 1 {
                    // Each shift pulls a cell down from above, so a column can need at
                    // most `height` shifts at one level.
                    let mut guard = 0;
                    while grid.get(Vec3i::new(x, y, z)) == Some(Cell::ClearPending)
                        && guard < height
                    {
                        shift_column_down(grid, x, y, z);
                        shifts += 1;
                        guard += 1;
                    }
                }
            }
        }

        let count = lines.len() as u32;
        self.lines_cleared = self.lines_cleared.saturating_add(count);
        let score = count.saturating_mul(count);
        if count > 0 {
            log::info!("cleared {count} line(s) ({shifts} cells collapsed) for {score} points");
        }

        if grid.is_clear_pending() {
            log::warn!("marked cells left behind after collapse");
        }
        self.phase = ClearPhase::Idle;

        CollapseReport {
            lines: lines.len(),
            score,
        }
    }
}

fn shift_column_down(grid: &mut VoxelGrid, x: i32, from_y: i32, z: i32) {
    let top = grid.size().y as i32 - 1;
    for y in from_y..top {
        let above = grid.get(Vec3i::new(x, y + 1, z));
        grid.set(Vec3i::new(x, y, z), above);
    }
    grid.set(Vec3i::new(x, top, z), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use crate::voxel_grid::{GridSize, PIECE_COLORS};

    const SIZE: GridSize = GridSize::new(6, 8, 5);

    fn block(i: usize) -> Option<Cell> {
        Some(Cell::Block(PIECE_COLORS[i]))
    }

    fn bordered() -> VoxelGrid {
        VoxelGrid::with_border(SIZE, &mut Rng::new(11))
    }

    fn fill_along_z(grid: &mut VoxelGrid, x: i32, y: i32) {
        for z in 1..SIZE.z as i32 - 1 {
            grid.set(Vec3i::new(x, y, z), block(0));
        }
    }

    fn fill_along_x(grid: &mut VoxelGrid, y: i32, z: i32) {
        for x in 1..SIZE.x as i32 - 1 {
            grid.set(Vec3i::new(x, y, z), block(1));
        }
    }

    #[test]
    fn incomplete_line_leaves_grid_untouched() {
        let mut grid = bordered();
        fill_along_z(&mut grid, 2, 1);
        grid.set(Vec3i::new(2, 1, 3), None);
        let before = grid.clone();

        let mut engine = LineClearEngine::default();
        assert!(!engine.check(&mut grid, Vec3i::new(2, 1, 1)));
        assert_eq!(grid, before);
        assert_eq!(engine.state(), ClearState::Idle);
    }

    #[test]
    fn full_line_is_marked_and_pending() {
        let mut grid = bordered();
        fill_along_z(&mut grid, 2, 1);

        let mut engine = LineClearEngine::default();
        assert!(engine.check(&mut grid, Vec3i::new(2, 1, 2)));
        assert_eq!(engine.state(), ClearState::PendingClear);
        assert!(grid.is_clear_pending());
        for z in 1..4 {
            assert_eq!(grid.get(Vec3i::new(2, 1, z)), Some(Cell::ClearPending));
        }

        // Checking the same line again does not record it twice.
        assert!(!engine.check(&mut grid, Vec3i::new(2, 1, 3)));
        assert_eq!(engine.pending_lines().len(), 1);
    }

    #[test]
    fn collapse_waits_for_delay_then_scores_one() {
        let mut grid = bordered();
        fill_along_x(&mut grid, 1, 2);
        let above = Vec3i::new(3, 2, 2);
        grid.set(above, block(4));

        let mut engine = LineClearEngine::new(Duration::from_millis(300));
        assert!(engine.check(&mut grid, Vec3i::new(1, 1, 2)));

        assert_eq!(engine.advance(&mut grid, Duration::from_millis(299)), None);
        let report = engine
            .advance(&mut grid, Duration::from_millis(1))
            .expect("delay expired");

        assert_eq!(report, CollapseReport { lines: 1, score: 1 });
        assert_eq!(engine.state(), ClearState::Idle);
        assert!(!grid.is_clear_pending());
        assert_eq!(grid.get(Vec3i::new(3, 1, 2)), block(4));
        assert_eq!(grid.get(above), None);
        assert_eq!(grid.get(Vec3i::new(1, 1, 2)), None);
        assert_eq!(engine.lines_cleared(), 1);
    }

    #[test]
    fn two_lines_in_one_pass_score_four() {
        let mut grid = bordered();
        fill_along_x(&mut grid, 1, 1);
        fill_along_x(&mut grid, 1, 3);

        let mut engine = LineClearEngine::default();
        assert!(engine.check(&mut grid, Vec3i::new(2, 1, 1)));
        assert!(engine.check(&mut grid, Vec3i::new(2, 1, 3)));

        let report = engine.collapse(&mut grid);
        assert_eq!(report, CollapseReport { lines: 2, score: 4 });
        assert!(!grid.is_clear_pending());
    }

    #[test]
    fn crossing_lines_are_both_detected() {
        let mut grid = bordered();
        fill_along_z(&mut grid, 2, 1);
        fill_along_x(&mut grid, 1, 2);

        let mut engine = LineClearEngine::default();
        assert!(engine.check(&mut grid, Vec3i::new(2, 1, 2)));
        assert_eq!(engine.pending_lines().len(), 2);

        let report = engine.collapse(&mut grid);
        assert_eq!(report.score, 4);
        assert!(!grid.is_clear_pending());
    }

    #[test]
    fn stacked_lines_collapse_in_the_same_pass() {
        let mut grid = bordered();
        fill_along_z(&mut grid, 3, 1);
        fill_along_z(&mut grid, 3, 2);
        let survivor = Vec3i::new(3, 3, 2);
        grid.set(survivor, block(2));

        let mut engine = LineClearEngine::default();
        assert!(engine.check(&mut grid, Vec3i::new(3, 1, 1)));
        assert!(engine.check(&mut grid, Vec3i::new(3, 2, 1)));

        let report = engine.collapse(&mut grid);
        assert_eq!(report.lines, 2);
        assert_eq!(grid.get(Vec3i::new(3, 1, 2)), block(2));
        assert_eq!(grid.get(Vec3i::new(3, 2, 2)), None);
        assert_eq!(grid.get(survivor), None);
    }

    #[test]
    fn border_is_never_collapsed() {
        let mut grid = bordered();
        let border_before: Vec<_> = grid.occupied().collect();
        fill_along_z(&mut grid, 1, 1);

        let mut engine = LineClearEngine::default();
        engine.check(&mut grid, Vec3i::new(1, 1, 1));
        engine.collapse(&mut grid);

        let after: Vec<_> = grid.occupied().collect();
        assert_eq!(after, border_before);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut grid = bordered();
        fill_along_z(&mut grid, 2, 2);
        let mut engine = LineClearEngine::default();
        engine.check(&mut grid, Vec3i::new(2, 2, 1));
        engine.reset();
        assert_eq!(engine.state(), ClearState::Idle);
        assert!(engine.pending_lines().is_empty());
    }
}
