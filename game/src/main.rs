use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use engine::HeadlessRunner;
use engine::profiling::StepStats;
use t3dris::autopilot::Autopilot;
use t3dris::config::ConfigStore;
use t3dris::input::{InputEvent, TickInput};
use t3dris::logic::T3drisLogic;

#[derive(Debug, Parser)]
#[command(name = "t3dris")]
#[command(about = "Headless T3DRIS session driven by a seeded autopilot")]
struct Cli {
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long, default_value_t = 1200)]
    ticks: usize,
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Config JSON; defaults to T3DRIS_CONFIG_PATH or the XDG config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the recorded session history as JSON.
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let store = cli
        .config
        .clone()
        .map(ConfigStore::at)
        .unwrap_or_else(ConfigStore::from_env);
    log::info!("config: {}", store.path().display());
    let config = store.load_or_default();
    log::info!(
        "grid {}x{}x{}, seed {}",
        config.grid.x,
        config.grid.y,
        config.grid.z,
        cli.seed
    );

    let dt = Duration::from_millis(cli.tick_ms);
    let mut runner = HeadlessRunner::new(T3drisLogic::new(config, cli.seed)?);
    let mut stats = StepStats::default();

    if runner.state().is_paused() {
        runner.step(TickInput::with(Duration::ZERO, [InputEvent::TogglePause]));
    }

    for input in Autopilot::new(cli.seed, dt).take(cli.ticks) {
        let frame = runner.step_profiled(input, &mut stats);
        if frame % 200 == 0 {
            let session = runner.state();
            log::info!(
                "frame {frame}: score {} level {} lines {}",
                session.score(),
                session.level(),
                session.lines_cleared()
            );
        }
        if runner.state().is_game_over() {
            break;
        }
    }

    let session = runner.state();
    println!(
        "frames {} score {} high_score {} level {} lines {} game_over {}",
        runner.frame(),
        session.score(),
        session.high_score().max(session.score()),
        session.level(),
        session.lines_cleared(),
        session.is_game_over()
    );
    log::info!(
        "{} steps, mean {:?}, slowest {:?}",
        stats.steps,
        stats.mean(),
        stats.slowest
    );

    if let Some(path) = cli.record {
        runner
            .timemachine()
            .save_json(&path)
            .with_context(|| format!("failed to write recording {}", path.display()))?;
        log::info!("wrote {} frames to {}", runner.timemachine().history().len(), path.display());
    }

    Ok(())
}
