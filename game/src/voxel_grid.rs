use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::rng::Rng;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vec3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3i {
    pub const ZERO: Vec3i = Vec3i { x: 0, y: 0, z: 0 };
    pub const DOWN: Vec3i = Vec3i { x: 0, y: -1, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vec3i {
    type Output = Vec3i;

    fn add(self, rhs: Vec3i) -> Self::Output {
        Vec3i::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3i {
    type Output = Vec3i;

    fn sub(self, rhs: Vec3i) -> Self::Output {
        Vec3i::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

pub const PIECE_COLORS: [Color; 5] = [
    Color::rgb(1.0, 0.0, 0.0),
    Color::rgb(0.0, 0.0, 1.0),
    Color::rgb(0.5, 0.0, 0.5),
    Color::rgb(0.0, 1.0, 0.0),
    Color::rgb(1.0, 1.0, 0.0),
];

pub const FLOOR_COLOR: Color = Color::rgb(0.5, 0.8, 1.0);

/// Contents of an occupied voxel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Cell {
    Block(Color),
    /// Part of a completed line waiting for the collapse delay to expire.
    ClearPending,
}

impl Cell {
    pub fn is_clear_pending(self) -> bool {
        matches!(self, Cell::ClearPending)
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Block(color) => Some(color),
            Cell::ClearPending => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridSize {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Cells a piece may occupy: strictly inside the walls, above the floor and
    /// off the open front face.
    pub fn in_play_volume(&self, p: Vec3i) -> bool {
        p.x >= 1
            && p.x <= self.x as i32 - 2
            && p.y >= 1
            && p.y < self.y as i32
            && p.z >= 1
            && p.z <= self.z as i32 - 2
    }
}

/// Fixed-size voxel terrain, stored flat as `(z * Y + y) * X + x`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoxelGrid {
    size: GridSize,
    cells: Vec<Option<Cell>>,
}

impl VoxelGrid {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.volume()],
        }
    }

    /// Grid with the floor and the three walls filled in. Wall blocks take random
    /// piece colors.
    pub fn with_border(size: GridSize, rng: &mut Rng) -> Self {
        let mut grid = Self::new(size);
        for z in 0..size.z as i32 {
            for y in 0..size.y as i32 {
                for x in 0..size.x as i32 {
                    let p = Vec3i::new(x, y, z);
                    if !grid.is_border(p) {
                        continue;
                    }
                    let color = if y == 0 {
                        FLOOR_COLOR
                    } else {
                        PIECE_COLORS[rng.below(PIECE_COLORS.len())]
                    };
                    grid.set(p, Some(Cell::Block(color)));
                }
            }
        }
        grid
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn contains(&self, p: Vec3i) -> bool {
        self.index(p).is_some()
    }

    pub fn index(&self, p: Vec3i) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.z < 0 {
            return None;
        }
        let (x, y, z) = (p.x as usize, p.y as usize, p.z as usize);
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        Some((z * self.size.y + y) * self.size.x + x)
    }

    /// Out-of-range reads are empty.
    pub fn get(&self, p: Vec3i) -> Option<Cell> {
        self.index(p).and_then(|i| self.cells[i])
    }

    /// Overwrites the cell. Out-of-range writes are dropped.
    pub fn set(&mut self, p: Vec3i, cell: Option<Cell>) {
        if let Some(i) = self.index(p) {
            self.cells[i] = cell;
        }
    }

    pub fn is_occupied(&self, p: Vec3i) -> bool {
        self.get(p).is_some()
    }

    /// Floor (`y == 0`) plus the walls at `x == 0`, `x == X-1` and `z == Z-1`
    /// below the top layer. The `z == 0` face is open above the floor.
    pub fn is_border(&self, p: Vec3i) -> bool {
        if !self.contains(p) {
            return false;
        }
        if p.y == 0 {
            return true;
        }
        let below_top = p.y < self.size.y as i32 - 1;
        let wall = p.x == 0 || p.x == self.size.x as i32 - 1 || p.z == self.size.z as i32 - 1;
        wall && below_top
    }

    pub fn in_play_volume(&self, p: Vec3i) -> bool {
        self.size.in_play_volume(p)
    }

    /// True while any cell is still marked for a pending line clear.
    pub fn is_clear_pending(&self) -> bool {
        self.cells
            .iter()
            .any(|cell| matches!(cell, Some(Cell::ClearPending)))
    }

    /// Empties every non-border cell.
    pub fn clear_interior(&mut self) {
        for z in 0..self.size.z as i32 {
            for y in 0..self.size.y as i32 {
                for x in 0..self.size.x as i32 {
                    let p = Vec3i::new(x, y, z);
                    if !self.is_border(p) {
                        self.set(p, None);
                    }
                }
            }
        }
    }

    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    pub fn position_of(&self, index: usize) -> Vec3i {
        let x = index % self.size.x;
        let y = (index / self.size.x) % self.size.y;
        let z = index / (self.size.x * self.size.y);
        Vec3i::new(x as i32, y as i32, z as i32)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Vec3i, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|cell| (self.position_of(i), cell)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
