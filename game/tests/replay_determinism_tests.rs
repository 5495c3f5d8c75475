use std::{
    fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use engine::{HeadlessRunner, TimeMachine, regression};
use t3dris::{
    autopilot::Autopilot,
    config::GameConfig,
    input::{InputEvent, TickInput},
    logic::T3drisLogic,
    session::Session,
};

fn unique_temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("t3dris_replay_{nanos}"))
}

fn logic(seed: u64) -> T3drisLogic {
    T3drisLogic::new(GameConfig::default(), seed).expect("default config is valid")
}

fn scripted_inputs(seed: u64, ticks: usize) -> Vec<TickInput> {
    let mut inputs = vec![TickInput::with(Duration::ZERO, [InputEvent::TogglePause])];
    inputs.extend(
        Autopilot::new(seed, Duration::from_millis(50))
            .with_cadence(2, 6)
            .take(ticks),
    );
    inputs
}

#[test]
fn same_seed_and_inputs_produce_identical_digests() {
    let inputs = scripted_inputs(4, 300);
    let a = regression::replay_digests(logic(4), inputs.clone())
        .expect("digest first run");
    let b = regression::replay_digests(logic(4), inputs)
        .expect("digest second run");
    assert_eq!(a.len(), 302);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_diverge() {
    let a = regression::replay_digests(
        logic(1),
        scripted_inputs(1, 50),
    )
    .expect("digest seed 1");
    let b = regression::replay_digests(
        logic(2),
        scripted_inputs(1, 50),
    )
    .expect("digest seed 2");
    assert_ne!(a, b);
}

#[test]
fn recorded_session_replays_from_disk() {
    let out_dir = unique_temp_dir();
    let artifacts = regression::record_then_replay_and_compare(
        "autopilot seed 9",
        &out_dir,
        logic(9),
        scripted_inputs(9, 400),
    )
    .expect("recording should replay identically");

    assert_eq!(artifacts.digests.len(), 402);
    assert!(artifacts.state_json.exists());

    let _ = fs::remove_dir_all(out_dir);
}

#[test]
fn timemachine_of_sessions_can_be_saved_and_rewound() {
    let logic = logic(13);
    let mut runner = HeadlessRunner::new(logic.clone());
    runner.run(scripted_inputs(13, 120));

    let out = unique_temp_dir().join("session.json");
    runner
        .timemachine()
        .save_json(&out)
        .expect("save session timemachine json");

    let loaded = TimeMachine::<Session>::load_json(&out).expect("load session timemachine json");
    let mut replay = HeadlessRunner::from_timemachine(logic, loaded);
    assert_eq!(replay.frame(), runner.frame());
    assert_eq!(replay.state().snapshot().score, runner.state().snapshot().score);

    replay.seek(0);
    assert!(replay.state().is_paused());
    replay.seek(1);
    assert!(!replay.state().is_paused());

    if let Some(parent) = out.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

#[test]
fn autopilot_session_makes_progress() {
    let mut runner = HeadlessRunner::new(logic(3));
    runner.run(scripted_inputs(3, 2000));

    let session = runner.state();
    let locked_cells = session
        .grid()
        .occupied()
        .filter(|(p, _)| !session.grid().is_border(*p))
        .count();
    assert!(
        locked_cells > 0 || session.lines_cleared() > 0 || session.is_game_over(),
        "pieces should have landed"
    );
    assert!(session.level() > 0 || session.is_game_over());
}

#[test]
fn saved_session_resumes_in_lockstep() {
    let logic = logic(6);
    let mut runner = HeadlessRunner::new(logic.clone());
    runner.step(TickInput::with(Duration::ZERO, [InputEvent::TogglePause]));
    for _ in 0..3 {
        runner.step(TickInput::with(Duration::ZERO, [InputEvent::HardDrop]));
        runner.step(TickInput::idle(Duration::from_millis(300)));
    }
    // Three decayed spawns leave a fall period with sub-millisecond digits.
    assert!(runner.state().fall_period().subsec_nanos() % 1_000_000 != 0);

    let out = unique_temp_dir().join("resume.json");
    runner.timemachine().save_json(&out).expect("save session timemachine json");
    let loaded = TimeMachine::<Session>::load_json(&out).expect("load session timemachine json");
    assert_eq!(loaded.state(), runner.state());

    let mut resumed = HeadlessRunner::from_timemachine(logic, loaded);
    for input in Autopilot::new(6, Duration::from_millis(50)).with_cadence(2, 6).take(300) {
        runner.step(input.clone());
        resumed.step(input);
        assert_eq!(resumed.state(), runner.state(), "frame {}", runner.frame());
    }

    if let Some(parent) = out.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}
