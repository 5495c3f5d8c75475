use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Every state a simulation has passed through, plus a cursor into that list.
///
/// Moving the cursor back and recording again forks the timeline: frames after the
/// cursor are discarded first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeMachine<S> {
    frames: Vec<S>,
    cursor: usize,
}

impl<S> TimeMachine<S> {
    pub fn new(first: S) -> Self {
        Self {
            frames: vec![first],
            cursor: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> &S {
        &self.frames[self.cursor]
    }

    pub fn state_at(&self, frame: usize) -> Option<&S> {
        self.frames.get(frame)
    }

    pub fn history(&self) -> &[S] {
        &self.frames
    }

    fn last_frame(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.seek(self.cursor.saturating_sub(frames))
    }

    /// Moves the cursor, clamped to the recorded range.
    pub fn seek(&mut self, frame: usize) -> usize {
        self.cursor = frame.min(self.last_frame());
        self.cursor
    }

    pub fn record(&mut self, state: S) -> usize {
        self.frames.truncate(self.cursor + 1);
        self.frames.push(state);
        self.cursor = self.last_frame();
        self.cursor
    }
}

impl<S: Serialize> TimeMachine<S> {
    /// Writes the whole timeline, creating parent directories as needed.
    pub fn save_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)?,
            _ => {}
        }
        let bytes = serde_json::to_vec(self).map_err(io::Error::other)?;
        fs::write(path, bytes)?;
        log::debug!("wrote {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }
}

impl<S: DeserializeOwned> TimeMachine<S> {
    pub fn load_json(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);

        let bytes = fs::read(path)?;
        let mut tm: Self = serde_json::from_slice(&bytes)
            .map_err(|e| invalid(format!("{}: {e}", path.display())))?;
        if tm.frames.is_empty() {
            return Err(invalid(format!("{}: no frames recorded", path.display())));
        }
        tm.seek(tm.cursor);
        Ok(tm)
    }
}
