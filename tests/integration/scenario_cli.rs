//! Integration tests for the CLI surface
//!
//! Network-free commands only; the `run` worker needs a live portal and is
//! covered by the transport-level tests instead.

use assert_cmd::Command;

#[test]
fn test_scenarios_lists_every_builtin() {
    let output = Command::cargo_bin("portal-loadtest")
        .unwrap()
        .arg("scenarios")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    for name in [
        "fetch_all",
        "multiple_instructions",
        "single_instruction",
        "empty_query",
    ] {
        assert!(stdout.contains(name), "missing scenario {name} in listing");
    }
}

#[test]
fn test_scenarios_payload_prints_query_json() {
    let output = Command::cargo_bin("portal-loadtest")
        .unwrap()
        .args(["scenarios", "--payload", "fetch_all"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON payload");
    assert_eq!(payload["type"], "solana");
    assert_eq!(payload["instructions"], serde_json::json!([{}]));
}

#[test]
fn test_scenarios_payload_rejects_unknown_scenario() {
    Command::cargo_bin("portal-loadtest")
        .unwrap()
        .args(["scenarios", "--payload", "warmup"])
        .assert()
        .failure();
}

#[test]
fn test_run_requires_from_block() {
    Command::cargo_bin("portal-loadtest")
        .unwrap()
        .arg("run")
        .assert()
        .failure();
}
