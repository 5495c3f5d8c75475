pub mod autopilot;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod input;
pub mod line_clear;
pub mod logic;
pub mod piece;
pub mod rng;
pub mod serde_duration;
pub mod session;
pub mod voxel_grid;
