//! CLI end-to-end tests
//!
//! Tests for the cmdforge command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the cmdforge binary
#[allow(deprecated)]
fn cmdforge_cmd() -> Command {
    Command::cargo_bin("cmdforge").unwrap()
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A stand-in for ffmpeg that echoes its arguments and exits with `code`.
#[cfg(unix)]
fn fake_ffmpeg(dir: &Path, code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    fs::write(&path, format!("#!/bin/sh\necho \"$@\"\nexit {code}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("cmdforge.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = cmdforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = cmdforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cmdforge"));
}

#[test]
fn test_cli_generate_trim() {
    let mut cmd = cmdforge_cmd();
    cmd.args([
        "generate",
        "trim",
        "--input",
        "in.mp4",
        "--set",
        "start_time=00:01:00",
        "--set",
        "duration=30",
    ]);
    let json = stdout_json(&mut cmd);

    assert_eq!(json["operation"], "trim");
    assert!(json.get("execution_result").is_none());
    let args: Vec<&str> = json["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(args[0], "ffmpeg");
    assert!(args.windows(2).any(|w| w == ["-ss", "00:01:00"]));
    assert!(args.windows(2).any(|w| w == ["-t", "30"]));
    assert!(args.windows(2).any(|w| w == ["-i", "in.mp4"]));
    assert_eq!(*args.last().unwrap(), "in_trim.mp4");
}

#[test]
fn test_cli_generate_scale_short_flags() {
    let mut cmd = cmdforge_cmd();
    cmd.args([
        "generate", "scale", "-i", "clip.mov", "-s", "width=1280", "-s", "height=-1", "-o",
        "small.mov",
    ]);
    let json = stdout_json(&mut cmd);
    assert!(json["command"]
        .as_str()
        .unwrap()
        .contains("scale=1280:-1"));
    assert_eq!(json["output_file"], "small.mov");
}

#[test]
fn test_cli_generate_concat_keeps_order() {
    let mut cmd = cmdforge_cmd();
    cmd.args([
        "generate", "concat", "-i", "b.mp4", "-i", "a.mp4", "-o", "joined.mp4",
    ]);
    let json = stdout_json(&mut cmd);
    assert_eq!(json["operation"], "concat");
    assert!(json["command"]
        .as_str()
        .unwrap()
        .contains("concat_list.txt"));
}

#[test]
fn test_cli_generate_missing_parameter() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["generate", "trim", "--input", "in.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start_time"));
}

#[test]
fn test_cli_generate_unknown_operation() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["generate", "reverse", "--input", "in.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation"));
}

#[test]
fn test_cli_generate_rejects_malformed_set() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["generate", "convert", "-i", "in.mp4", "--set", "output_format"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[cfg(unix)]
#[test]
fn test_cli_generate_execute_with_fake_ffmpeg() {
    let dir = tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(dir.path(), 0);
    let config = write_config(
        dir.path(),
        &format!("[tools]\nffmpeg_path = {:?}\n", ffmpeg.to_string_lossy()),
    );

    let mut cmd = cmdforge_cmd();
    cmd.arg("--config")
        .arg(&config)
        .args(["generate", "convert", "-i", "a b.mp4", "-s", "output_format=mkv", "-x"]);
    let json = stdout_json(&mut cmd);

    let result = &json["execution_result"];
    assert_eq!(result["status"], "success");
    assert_eq!(result["exit_code"], 0);
    let echoed = result["stdout"].as_str().unwrap();
    assert!(echoed.contains("-i a b.mp4"), "{echoed}");
    assert!(echoed.trim_end().ends_with("a b_convert.mkv"), "{echoed}");
}

#[cfg(unix)]
#[test]
fn test_cli_run_reports_non_zero_exit() {
    let dir = tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(dir.path(), 2);
    let config = write_config(
        dir.path(),
        &format!("[tools]\nffmpeg_path = {:?}\n", ffmpeg.to_string_lossy()),
    );

    let mut cmd = cmdforge_cmd();
    cmd.arg("--config")
        .arg(&config)
        .args(["run", "ffmpeg -i 'x.mp4; rm -rf /' out.mkv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"non_zero_exit\""))
        .stdout(predicate::str::contains("x.mp4; rm -rf /"));
}

#[test]
fn test_cli_run_unbalanced_quote() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["run", "--", "-i 'unterminated.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command"));
}

#[test]
fn test_cli_operations_lists_catalog() {
    let mut cmd = cmdforge_cmd();
    cmd.arg("operations");
    let json = stdout_json(&mut cmd);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["operation"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["trim", "convert", "compress", "extract_audio", "scale", "overlay", "concat"]
    );
}

#[test]
fn test_cli_docs_urls() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["docs", "urls", "ffmpeg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://ffmpeg.org/ffmpeg-filters.html"));
}

#[test]
fn test_cli_docs_fetch_help() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["docs", "fetch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<URL>"));
}

#[test]
fn test_cli_docs_fetch_unreachable_url() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["docs", "fetch", "http://127.0.0.1:9/page"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://127.0.0.1:9/page"));
}

#[test]
fn test_cli_generate_help_lists_set_short_flag() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-s, --set <KEY=VALUE>"));
}

#[test]
fn test_cli_docs_urls_unknown_category() {
    let mut cmd = cmdforge_cmd();
    cmd.args(["docs", "urls", "gstreamer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("live_streaming"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = cmdforge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[defaults]\ncrf = 60\n");

    let mut cmd = cmdforge_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("warning"));
}

#[test]
fn test_cli_validate_missing_file() {
    let dir = tempdir().unwrap();
    let mut cmd = cmdforge_cmd();
    cmd.arg("validate")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure();
}
