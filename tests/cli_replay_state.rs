use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "uirec-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn record_demo(dir: &Path) -> PathBuf {
    let out = dir.join("session.json");
    let status = Command::new(env!("CARGO_BIN_EXE_record_demo"))
        .args(["--out", out.to_str().unwrap()])
        .status()
        .expect("run record_demo");
    assert!(status.success());
    out
}

/// --trace 时 JSON 之前还有若干 `apply` 行
fn json_tail(stdout: &str) -> Value {
    let start = stdout.find("\n{").map_or(0, |i| i + 1);
    serde_json::from_str(&stdout[start..]).expect("state json")
}

#[test]
fn replay_state_mid_session() {
    let dir = unique_temp_dir("replay-mid");
    let rec = record_demo(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_replay_state"))
        .args(["--recording", rec.to_str().unwrap(), "--at-ms", "300"])
        .output()
        .expect("run replay_state");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v = json_tail(&String::from_utf8(output.stdout).expect("utf8"));
    assert_eq!(v["at"], 300);
    assert_eq!(v["pointer"]["pressed"], true);
    assert_eq!(v["pointer"]["node_id"], 7);
    assert_eq!(v["viewport"][0], 1280);
    assert!(v["scroll"].as_object().expect("scroll map").is_empty());
}

#[test]
fn replay_state_trace_lists_applied_events_in_order() {
    let dir = unique_temp_dir("replay-trace");
    let rec = record_demo(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_replay_state"))
        .args(["--recording", rec.to_str().unwrap(), "--trace"])
        .output()
        .expect("run replay_state");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");

    let times: Vec<u64> = stdout
        .lines()
        .filter_map(|l| l.strip_prefix("apply t="))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(|t| t.parse().expect("timestamp"))
        .collect();
    // 除 Snapshot 外的 21 条事件
    assert_eq!(times.len(), 21);
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let v = json_tail(&stdout);
    assert_eq!(v["applied_events"], 21);
    assert_eq!(v["last_click"]["node_id"], 4);
    assert_eq!(v["custom_tags"][0], "canvas-snapshot");
}

#[test]
fn replay_state_missing_file_fails() {
    let dir = unique_temp_dir("replay-missing");
    let output = Command::new(env!("CARGO_BIN_EXE_replay_state"))
        .args(["--recording", dir.join("nope.json").to_str().unwrap()])
        .output()
        .expect("run replay_state");
    assert!(!output.status.success());
}
