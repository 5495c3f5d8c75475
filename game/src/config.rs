use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::{Shape, spawn_anchor};
use crate::voxel_grid::GridSize;

/// Largest accepted extent along any axis.
pub const MAX_GRID_EXTENT: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridSize,
    #[serde(with = "crate::serde_duration::millis")]
    pub initial_fall_period: Duration,
    /// Factor applied to the fall period on every spawn.
    pub speed_decay: f64,
    #[serde(with = "crate::serde_duration::millis")]
    pub spawn_delay: Duration,
    #[serde(with = "crate::serde_duration::millis")]
    pub clear_delay: Duration,
    pub start_paused: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(12, 21, 12),
            initial_fall_period: Duration::from_millis(1000),
            speed_decay: 0.985,
            spawn_delay: Duration::from_millis(300),
            clear_delay: Duration::from_millis(crate::line_clear::CLEAR_DELAY_MS_DEFAULT),
            start_paused: true,
        }
    }
}

impl GameConfig {
    pub fn sanitized(mut self) -> Self {
        if !self.speed_decay.is_finite() {
            self.speed_decay = Self::default().speed_decay;
        }
        self.speed_decay = self.speed_decay.clamp(0.0, 1.0);
        self.grid.x = self.grid.x.min(MAX_GRID_EXTENT);
        self.grid.y = self.grid.y.min(MAX_GRID_EXTENT);
        self.grid.z = self.grid.z.min(MAX_GRID_EXTENT);
        self
    }

    /// Rejects configurations a session could not run: every shape must spawn
    /// inside the play volume and the fall period must shrink (or hold) on spawn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridSize { x, y, z } = self.grid;
        if x > MAX_GRID_EXTENT || y > MAX_GRID_EXTENT || z > MAX_GRID_EXTENT {
            return Err(ConfigError::Invalid(format!(
                "grid {x}x{y}x{z} exceeds {MAX_GRID_EXTENT} cells per axis"
            )));
        }
        if !(self.speed_decay > 0.0 && self.speed_decay <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "speed_decay must be in (0, 1], got {}",
                self.speed_decay
            )));
        }
        if self.initial_fall_period.is_zero() {
            return Err(ConfigError::Invalid(
                "initial_fall_period must be positive".to_string(),
            ));
        }
        let anchor = spawn_anchor(self.grid);
        for shape in Shape::ALL {
            if let Some(p) = shape
                .offsets()
                .into_iter()
                .map(|d| anchor + d)
                .find(|&p| !self.grid.in_play_volume(p))
            {
                return Err(ConfigError::Invalid(format!(
                    "grid {x}x{y}x{z} cannot place {shape:?} (cube at {}, {}, {})",
                    p.x, p.y, p.z
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("T3DRIS_CONFIG_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("t3dris");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults. Anything present must parse and validate.
    pub fn load(&self) -> Result<GameConfig, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", self.path.display());
                return Ok(GameConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let config = serde_json::from_slice::<GameConfig>(&bytes)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?
            .sanitized();
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(&self) -> GameConfig {
        self.load().unwrap_or_else(|e| {
            log::warn!("{e}; falling back to default config");
            GameConfig::default()
        })
    }

    pub fn save(&self, config: &GameConfig) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}
