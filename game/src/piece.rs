use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cooldown::Cooldown;
use crate::input::InputEvent;
use crate::voxel_grid::{Cell, Color, GridSize, PIECE_COLORS, Vec3i, VoxelGrid};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    I,
    L,
    S,
    T,
}

impl Shape {
    pub const ALL: [Shape; 5] = [Shape::Cube, Shape::I, Shape::L, Shape::S, Shape::T];

    pub fn index(self) -> usize {
        match self {
            Shape::Cube => 0,
            Shape::I => 1,
            Shape::L => 2,
            Shape::S => 3,
            Shape::T => 4,
        }
    }

    pub fn color(self) -> Color {
        PIECE_COLORS[self.index()]
    }

    /// Index into the spawn cube list of the cube rotations turn around.
    pub fn pivot(self) -> usize {
        match self {
            Shape::Cube | Shape::L => 0,
            Shape::I | Shape::S => 2,
            Shape::T => 1,
        }
    }

    /// The 2x2x2 cube looks the same after any quarter turn.
    pub fn can_rotate(self) -> bool {
        !matches!(self, Shape::Cube)
    }

    /// Cube offsets from the spawn anchor `(X/2 - 1, Y - 2, Z/2 - 1)`.
    pub fn offsets(self) -> Vec<Vec3i> {
        match self {
            Shape::Cube => {
                let mut cubes = Vec::with_capacity(8);
                for i in 0..2 {
                    for j in 0..2 {
                        for k in 0..2 {
                            cubes.push(Vec3i::new(i, -j, k));
                        }
                    }
                }
                cubes
            }
            Shape::I => (0..4).map(|i| Vec3i::new(i, 0, 0)).collect(),
            Shape::L => {
                let mut cubes: Vec<_> = (0..3).map(|i| Vec3i::new(i, 0, 0)).collect();
                cubes.push(Vec3i::new(0, 0, 1));
                cubes
            }
            Shape::S => (0..2)
                .flat_map(|i| [Vec3i::new(i, 0, 0), Vec3i::new(i + 1, 0, 1)])
                .collect(),
            Shape::T => {
                let mut cubes: Vec<_> = (0..3).map(|i| Vec3i::new(i, 0, 0)).collect();
                cubes.push(Vec3i::new(1, 0, 1));
                cubes
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    /// Quarter turn of a pivot-relative offset in the horizontal plane.
    fn apply(self, d: Vec3i) -> Vec3i {
        match self {
            RotationDir::Cw => Vec3i::new(d.z, d.y, -d.x),
            RotationDir::Ccw => Vec3i::new(-d.z, d.y, d.x),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceUpdate {
    Falling,
    Locked,
    /// Locked with a cube still on the spawn row.
    ToppedOut,
}

pub fn spawn_anchor(size: GridSize) -> Vec3i {
    Vec3i::new(
        size.x as i32 / 2 - 1,
        spawn_row(size),
        size.z as i32 / 2 - 1,
    )
}

pub fn spawn_row(size: GridSize) -> i32 {
    size.y as i32 - 2
}

/// The falling piece. Its cubes are only written to the grid between ticks; `update`
/// lifts them out first so the piece never collides with itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivePiece {
    shape: Shape,
    cubes: Vec<Vec3i>,
    fall: Cooldown,
    spawn_row: i32,
}

impl ActivePiece {
    pub fn spawn(shape: Shape, size: GridSize, fall_period: Duration) -> Self {
        let anchor = spawn_anchor(size);
        Self {
            shape,
            cubes: shape.offsets().into_iter().map(|d| anchor + d).collect(),
            fall: Cooldown::new(fall_period),
            spawn_row: anchor.y,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn cubes(&self) -> &[Vec3i] {
        &self.cubes
    }

    pub fn pivot(&self) -> Vec3i {
        self.cubes[self.shape.pivot()]
    }

    pub fn draw(&self, grid: &mut VoxelGrid) {
        for &p in &self.cubes {
            grid.set(p, Some(Cell::Block(self.shape.color())));
        }
    }

    pub fn erase(&self, grid: &mut VoxelGrid) {
        for &p in &self.cubes {
            grid.set(p, None);
        }
    }

    /// Whether every cube may sit at the given cells. Expects the piece to be erased.
    pub fn fits(grid: &VoxelGrid, cells: &[Vec3i]) -> bool {
        cells
            .iter()
            .all(|&p| grid.in_play_volume(p) && !grid.is_occupied(p))
    }

    /// No cube can move one unit down. Expects the piece to be erased.
    pub fn is_grounded(&self, grid: &VoxelGrid) -> bool {
        self.cubes
            .iter()
            .any(|&p| grid.is_occupied(p + Vec3i::DOWN) || !grid.in_play_volume(p + Vec3i::DOWN))
    }

    /// Moves every cube by `delta`, or none of them. Expects the piece to be erased.
    pub fn translate(&mut self, grid: &VoxelGrid, delta: Vec3i) -> bool {
        let candidate: Vec<Vec3i> = self.cubes.iter().map(|&p| p + delta).collect();
        if !Self::fits(grid, &candidate) {
            return false;
        }
        self.cubes = candidate;
        true
    }

    /// Quarter turn around the pivot cube; rejected as a whole if any cube would land
    /// outside the play volume or on an occupied cell. Expects the piece to be erased.
    pub fn rotate(&mut self, grid: &VoxelGrid, dir: RotationDir) -> bool {
        if !self.shape.can_rotate() {
            return false;
        }
        let pivot = self.pivot();
        let candidate: Vec<Vec3i> = self
            .cubes
            .iter()
            .map(|&p| pivot + dir.apply(p - pivot))
            .collect();
        if !Self::fits(grid, &candidate) {
            return false;
        }
        self.cubes = candidate;
        true
    }

    /// Drops the piece onto whatever is below it. Returns the distance fallen.
    pub fn hard_drop(&mut self, grid: &VoxelGrid) -> u32 {
        let mut distance = 0u32;
        let max_steps = grid.size().y;
        while !self.is_grounded(grid) && (distance as usize) < max_steps {
            if !self.translate(grid, Vec3i::DOWN) {
                break;
            }
            distance += 1;
        }
        distance
    }

    /// One simulation tick: gravity, hard drop, then the move and rotation events in
    /// arrival order. The piece is drawn back into the grid before returning.
    pub fn update(&mut self, grid: &mut VoxelGrid, dt: Duration, events: &[InputEvent]) -> PieceUpdate {
        self.erase(grid);

        let grounded = self.is_grounded(grid);
        self.fall.advance(dt);
        let fall_due = self.fall.ready();
        if fall_due && !grounded {
            self.translate(grid, Vec3i::DOWN);
        }

        let drop_requested = events.contains(&InputEvent::HardDrop);
        if drop_requested && !self.is_grounded(grid) {
            let distance = self.hard_drop(grid);
            self.fall.reset();
            log::debug!("{:?} hard-dropped {distance} rows", self.shape);
        }

        for event in events {
            match event {
                InputEvent::MoveLeft => {
                    self.translate(grid, Vec3i::new(-1, 0, 0));
                }
                InputEvent::MoveRight => {
                    self.translate(grid, Vec3i::new(1, 0, 0));
                }
                InputEvent::MoveBack => {
                    self.translate(grid, Vec3i::new(0, 0, -1));
                }
                InputEvent::MoveForward => {
                    self.translate(grid, Vec3i::new(0, 0, 1));
                }
                InputEvent::RotateCw => {
                    self.rotate(grid, RotationDir::Cw);
                }
                InputEvent::RotateCcw => {
                    self.rotate(grid, RotationDir::Ccw);
                }
                _ => {}
            }
        }

        let settled = self.is_grounded(grid);
        self.draw(grid);

        if !settled || !(drop_requested || (fall_due && grounded)) {
            return PieceUpdate::Falling;
        }
        if self.cubes.iter().any(|p| p.y == self.spawn_row) {
            return PieceUpdate::ToppedOut;
        }
        PieceUpdate::Locked
    }
}
