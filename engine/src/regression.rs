//! Deterministic replay checks.
//!
//! A scenario is run live, its `TimeMachine` saved as JSON, then the recording is
//! loaded back and re-simulated from its first frame with the same inputs. Every
//! frame is compared by a SHA-256 digest of its serialized state.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

use crate::{GameLogic, HeadlessRunner, TimeMachine};

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn bytes_sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn state_sha256_hex<S: Serialize>(state: &S) -> io::Result<String> {
    let bytes =
        serde_json::to_vec(state).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(bytes_sha256_hex(&bytes))
}

pub fn history_digests<S: Serialize>(tm: &TimeMachine<S>) -> io::Result<Vec<String>> {
    tm.history().iter().map(state_sha256_hex).collect()
}

/// Runs `inputs` from the game's initial state and digests every frame, initial frame included.
pub fn replay_digests<G>(game: G, inputs: impl IntoIterator<Item = G::Input>) -> io::Result<Vec<String>>
where
    G: GameLogic,
    G::State: Serialize,
{
    let mut runner = HeadlessRunner::new(game);
    runner.run(inputs);
    history_digests(runner.timemachine())
}

pub fn assert_digests_match(expected: &[String], actual: &[String]) -> io::Result<()> {
    if expected.len() != actual.len() {
        return Err(io::Error::other(format!(
            "frame count mismatch: expected {} digests, got {}",
            expected.len(),
            actual.len()
        )));
    }
    for (i, (a, b)) in expected.iter().zip(actual.iter()).enumerate() {
        if a != b {
            return Err(io::Error::other(format!(
                "state mismatch at frame {i}:\nexpected: {a}\nactual:   {b}"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RecordReplayArtifacts {
    pub state_json: PathBuf,
    pub digests: Vec<String>,
}

/// Records `inputs` live, saves the recording under `out_dir`, reloads it and
/// re-simulates from the recorded first frame. Errors if any frame diverges.
pub fn record_then_replay_and_compare<G>(
    name: &str,
    out_dir: impl AsRef<Path>,
    game: G,
    inputs: Vec<G::Input>,
) -> io::Result<RecordReplayArtifacts>
where
    G: GameLogic + Clone,
    G::State: Serialize + DeserializeOwned + Clone,
    G::Input: Clone,
{
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let state_json = out_dir.join(format!("{}.json", sanitize_filename(name)));

    let mut live = HeadlessRunner::new(game.clone());
    live.run(inputs.iter().cloned());
    live.timemachine().save_json(&state_json)?;
    let live_digests = history_digests(live.timemachine())?;

    let loaded = TimeMachine::<G::State>::load_json(&state_json)?;
    assert_digests_match(&live_digests, &history_digests(&loaded)?)?;

    let first = loaded
        .state_at(0)
        .cloned()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "recording has no frames"))?;
    let mut replay = HeadlessRunner::from_timemachine(game, TimeMachine::new(first));
    replay.run(inputs);
    let replay_digests = history_digests(replay.timemachine())?;
    assert_digests_match(&live_digests, &replay_digests)?;

    log::info!(
        "replay of '{name}' matched {} frames ({})",
        live_digests.len(),
        state_json.display()
    );

    Ok(RecordReplayArtifacts {
        state_json,
        digests: live_digests,
    })
}
