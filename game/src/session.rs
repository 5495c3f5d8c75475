use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::cooldown::Cooldown;
use crate::input::{InputEvent, TickInput};
use crate::line_clear::{ClearState, LineClearEngine};
use crate::piece::{ActivePiece, PieceUpdate, Shape, spawn_anchor};
use crate::rng::Rng;
use crate::voxel_grid::{Cell, Color, GridSize, Vec3i, VoxelGrid};

/// Levels run from 0 at the initial fall period towards this cap as pieces speed up.
pub const MAX_LEVEL: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceView {
    pub shape: Shape,
    pub color: Color,
    pub cubes: Vec<Vec3i>,
}

impl PieceView {
    fn of(piece: &ActivePiece) -> Self {
        Self {
            shape: piece.shape(),
            color: piece.shape().color(),
            cubes: piece.cubes().to_vec(),
        }
    }

    /// The preview as it would appear when spawned.
    fn preview(shape: Shape, size: GridSize) -> Self {
        let anchor = spawn_anchor(size);
        Self {
            shape,
            color: shape.color(),
            cubes: shape.offsets().into_iter().map(|d| anchor + d).collect(),
        }
    }
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub grid_size: GridSize,
    pub cells: Vec<Option<Cell>>,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub current: Option<PieceView>,
    pub next: PieceView,
    pub paused: bool,
    pub game_over: bool,
    pub clear_pending: bool,
    pub lines_cleared: u32,
    pub projection: ProjectionMode,
}

/// One game of T3DRIS: the grid, the falling piece, the preview and the scoring state.
///
/// Advanced only through [`Session::tick`]. The whole session is plain data, so it can
/// be cloned into a `TimeMachine` and saved as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    config: GameConfig,
    grid: VoxelGrid,
    clear: LineClearEngine,
    current: Option<ActivePiece>,
    next: Shape,
    #[serde(with = "crate::serde_duration::nanos")]
    fall_period: Duration,
    spawn: Cooldown,
    paused: bool,
    game_over: bool,
    projection: ProjectionMode,
    score: u32,
    high_score: u32,
    rng: Rng,
}

impl Session {
    /// Sanitizes and validates `config`, then builds the bordered grid with the
    /// first piece drawn in.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let config = config.sanitized();
        config.validate()?;
        Ok(Self::from_valid(config, seed))
    }

    /// Expects a config that already passed `validate`.
    pub(crate) fn from_valid(config: GameConfig, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let mut grid = VoxelGrid::with_border(config.grid, &mut rng);
        let next = random_shape(&mut rng);
        let first = random_shape(&mut rng);
        let current = ActivePiece::spawn(first, config.grid, config.initial_fall_period);
        current.draw(&mut grid);

        Self {
            grid,
            clear: LineClearEngine::new(config.clear_delay),
            current: Some(current),
            next,
            fall_period: config.initial_fall_period,
            spawn: Cooldown::new(config.spawn_delay),
            paused: config.start_paused,
            game_over: false,
            projection: ProjectionMode::default(),
            score: 0,
            high_score: 0,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Direct grid access for setting up scenarios. The falling piece is part of the
    /// grid contents between ticks.
    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    pub fn current(&self) -> Option<&ActivePiece> {
        self.current.as_ref()
    }

    pub fn next_shape(&self) -> Shape {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn fall_period(&self) -> Duration {
        self.fall_period
    }

    pub fn clear_state(&self) -> ClearState {
        self.clear.state()
    }

    pub fn lines_cleared(&self) -> u32 {
        self.clear.lines_cleared()
    }

    pub fn level(&self) -> u32 {
        let initial = self.config.initial_fall_period.as_secs_f64();
        if initial <= 0.0 {
            return 0;
        }
        let ratio = self.fall_period.as_secs_f64() / initial;
        let level = (MAX_LEVEL as f64 * (1.0 - ratio)).floor();
        level.clamp(0.0, MAX_LEVEL as f64) as u32
    }

    pub fn tick(&mut self, input: &TickInput) {
        for event in input.events.iter().copied().filter(|e| e.is_session_event()) {
            match event {
                InputEvent::TogglePause => {
                    self.paused = !self.paused;
                    log::info!("{}", if self.paused { "paused" } else { "resumed" });
                }
                InputEvent::Restart => self.restart(),
                InputEvent::ToggleProjectionMode => {
                    self.projection = self.projection.toggled();
                }
                _ => {}
            }
        }

        if self.paused || self.game_over {
            return;
        }

        if let Some(report) = self.clear.advance(&mut self.grid, input.dt) {
            self.score = self.score.saturating_add(report.score);
        }

        self.spawn.advance(input.dt);
        if self.current.is_none() && !self.grid.is_clear_pending() && self.spawn.ready() {
            self.spawn_next();
        }

        let Some(piece) = self.current.as_mut() else {
            return;
        };
        match piece.update(&mut self.grid, input.dt, &input.events) {
            PieceUpdate::Falling => {}
            PieceUpdate::Locked => {
                log::debug!("{:?} locked at {:?}", piece.shape(), piece.cubes());
                for &p in piece.cubes() {
                    self.clear.check(&mut self.grid, p);
                }
                self.current = None;
                self.spawn.reset();
            }
            PieceUpdate::ToppedOut => {
                self.current = None;
                self.end_game();
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            grid_size: self.grid.size(),
            cells: self.grid.cells().to_vec(),
            score: self.score,
            high_score: self.high_score,
            level: self.level(),
            current: self.current.as_ref().map(PieceView::of),
            next: PieceView::preview(self.next, self.grid.size()),
            paused: self.paused,
            game_over: self.game_over,
            clear_pending: self.grid.is_clear_pending(),
            lines_cleared: self.clear.lines_cleared(),
            projection: self.projection,
        }
    }

    fn spawn_next(&mut self) {
        let shape = self.next;
        let piece = ActivePiece::spawn(shape, self.grid.size(), self.fall_period);
        if !ActivePiece::fits(&self.grid, piece.cubes()) {
            self.end_game();
            log::info!("{shape:?} blocked at spawn");
            return;
        }
        piece.draw(&mut self.grid);
        self.current = Some(piece);
        self.next = random_shape(&mut self.rng);
        self.fall_period = self.fall_period.mul_f64(self.config.speed_decay);
        log::debug!(
            "spawned {shape:?}, next {:?}, fall period {:?}",
            self.next,
            self.fall_period
        );
    }

    fn end_game(&mut self) {
        self.game_over = true;
        self.high_score = self.high_score.max(self.score);
        log::info!(
            "game over: score {} (high score {})",
            self.score,
            self.high_score
        );
    }

    fn restart(&mut self) {
        self.high_score = self.high_score.max(self.score);
        self.grid.clear_interior();
        self.clear.reset();
        self.current = None;
        self.fall_period = self.config.initial_fall_period;
        self.spawn = Cooldown::new(self.config.spawn_delay);
        self.score = 0;
        self.game_over = false;
        log::info!("restarted (high score {})", self.high_score);
    }
}

fn random_shape(rng: &mut Rng) -> Shape {
    Shape::ALL[rng.below(Shape::ALL.len())]
}
