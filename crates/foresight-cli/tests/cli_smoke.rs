//! End-to-end launcher tests using assert_cmd.
//!
//! These exercise the compiled `foresight-train` binary to verify the
//! launcher contract: the JSON envelope on stdout, the exit code mirroring
//! `status`, and the trainer invocation path.

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("foresight-train").unwrap();
    // isolate from the ambient environment
    cmd.env_remove("FORESIGHT_STRATEGY");
    cmd.env_remove("FORESIGHT_TRAIN_CONFIG");
    cmd
}

/// Write a small linearly separable dataset and return its path.
fn write_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("train.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "feature_a,feature_b,outcome").unwrap();
    for i in 0..20 {
        let jitter = (i % 5) as f32 * 0.05;
        writeln!(file, "{},{},1", 2.0 + jitter, -1.5 - jitter).unwrap();
        writeln!(file, "{},{},0", -2.0 - jitter, 1.5 + jitter).unwrap();
    }
    path
}

// ---------------------------------------------------------------------------
// Usage errors (fewer than three arguments)
// ---------------------------------------------------------------------------

#[test]
fn no_args_emits_usage_envelope() {
    cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"status\":1"))
        .stdout(predicate::str::contains("\"runid\""))
        .stdout(predicate::str::contains("Missing arguments"))
        .stdout(predicate::str::contains("modelid").not());
}

#[test]
fn one_arg_includes_modelid() {
    cmd()
        .arg("m1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"modelid\":\"m1\""))
        .stdout(predicate::str::contains("\"status\":1"));
}

#[test]
fn two_args_still_a_usage_error() {
    cmd()
        .args(["m1", "/tmp/out"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Missing arguments"));
}

// ---------------------------------------------------------------------------
// Training invocations
// ---------------------------------------------------------------------------

#[test]
fn three_args_train_and_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");

    cmd()
        .args(["m1", out_dir.to_str().unwrap(), data.to_str().unwrap()])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\":0"))
        .stdout(predicate::str::contains("\"modelid\":\"m1\""))
        .stdout(predicate::str::contains("\"accuracy\""));

    // artifacts land under <directory>/<modelid>/<runid>/
    let model_dir = out_dir.join("m1");
    let run_dir = std::fs::read_dir(&model_dir).unwrap().next().unwrap().unwrap();
    assert!(run_dir.path().join("model.json").exists());
    assert!(run_dir.path().join("config.json").exists());
    assert!(run_dir.path().join("report.html").exists());
}

#[test]
fn extra_args_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");

    cmd()
        .args([
            "m1",
            out_dir.to_str().unwrap(),
            data.to_str().unwrap(),
            "ignored",
            "also-ignored",
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\":0"));
}

#[test]
fn unreadable_training_file_exits_nonzero_with_envelope() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["m1", dir.path().to_str().unwrap(), "/nonexistent/train.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"status\":1"))
        .stdout(predicate::str::contains("\"errors\""));
}

#[test]
fn stdout_is_exactly_one_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");

    let output = cmd()
        .args(["m1", out_dir.to_str().unwrap(), data.to_str().unwrap()])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let envelope: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(envelope["status"], 0);
    assert!(envelope["runid"].is_i64());
    assert!(envelope["accuracy"].is_f64());
    assert_eq!(envelope["strategy"], "logistic-regression");
}

// ---------------------------------------------------------------------------
// Strategy and configuration selection
// ---------------------------------------------------------------------------

#[test]
fn strategy_env_selects_neural_network() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");

    cmd()
        .env("FORESIGHT_STRATEGY", "neural-network")
        .args(["m1", out_dir.to_str().unwrap(), data.to_str().unwrap()])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"strategy\":\"neural-network\""));
}

#[test]
fn unknown_strategy_reports_envelope_not_crash() {
    cmd()
        .env("FORESIGHT_STRATEGY", "decision-forest")
        .args(["m1", "/tmp/out", "/tmp/train.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"status\":1"))
        .stdout(predicate::str::contains("Unknown strategy"));
}

#[test]
fn config_file_env_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"epochs": 50, "seed": 3}"#).unwrap();

    cmd()
        .env("FORESIGHT_TRAIN_CONFIG", config_path.to_str().unwrap())
        .args(["m1", out_dir.to_str().unwrap(), data.to_str().unwrap()])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\":0"));
}

#[test]
fn missing_config_file_reports_envelope() {
    cmd()
        .env("FORESIGHT_TRAIN_CONFIG", "/nonexistent/config.json")
        .args(["m1", "/tmp/out", "/tmp/train.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid trainer configuration"));
}

// ---------------------------------------------------------------------------
// CLI niceties
// ---------------------------------------------------------------------------

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("modelid"));
}

#[test]
fn version_flag() {
    cmd().arg("--version").assert().success();
}
