use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::TimeMachine;

fn unique_temp_json_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("t3dris_engine_{tag}_{nanos}.json"))
}

#[test]
fn timemachine_save_and_load_roundtrips_history_and_frame() {
    let mut tm = TimeMachine::new(0i32);
    tm.record(1);
    tm.record(2);

    // Rewind and branch to ensure truncate-on-record behavior persists.
    tm.rewind(1);
    tm.record(99);

    assert_eq!(tm.frame(), 2);
    assert_eq!(tm.history(), &[0, 1, 99]);

    let out = unique_temp_json_path("roundtrip");
    tm.save_json(&out).expect("save timemachine json");

    let loaded = TimeMachine::<i32>::load_json(&out).expect("load timemachine json");
    assert_eq!(loaded.frame(), tm.frame());
    assert_eq!(loaded.history(), tm.history());
    assert_eq!(loaded.state(), tm.state());

    let _ = fs::remove_file(out);
}

#[test]
fn loading_garbage_reports_invalid_data() {
    let out = unique_temp_json_path("garbage");
    fs::write(&out, b"not json").expect("write garbage");

    let err = TimeMachine::<i32>::load_json(&out).expect_err("garbage must not parse");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let _ = fs::remove_file(out);
}

#[test]
fn loading_empty_history_is_rejected() {
    let out = unique_temp_json_path("empty");
    fs::write(&out, br#"{"frames":[],"cursor":0}"#).expect("write empty recording");

    let err = TimeMachine::<i32>::load_json(&out).expect_err("empty history must fail");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let _ = fs::remove_file(out);
}
