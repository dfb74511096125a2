//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a temporary project directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command in `project` and return (stdout, stderr, exit code).
fn run_cli(project: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_vidcoder-cli"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("VIDCODER_CODER")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn ok(project: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(project, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

/// A project with a "Gaze" timeline carrying a "Look" label.
fn gaze_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    ok(dir.path(), &["init"]);
    ok(dir.path(), &["timeline", "add", "Gaze"]);
    ok(dir.path(), &["timeline", "event", "Gaze", "Look", "--color", "#0000ff"]);
    dir
}

fn exported(project: &Path) -> String {
    ok(project, &["csv", "export"])
}

#[test]
fn test_init_creates_project_files() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = ok(dir.path(), &["init"]);
    assert!(stdout.contains("initialized project"));
    assert!(dir.path().join("config.toml").exists());
    assert!(dir.path().join("annotations.csv").exists());

    let (_, stderr, code) = run_cli(dir.path(), &["init"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_timeline_list_json() {
    let dir = gaze_project();
    let stdout = ok(dir.path(), &["timeline", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed[0]["name"], "Gaze");
    assert_eq!(parsed[0]["events"][0]["name"], "Look");
    assert_eq!(parsed[0]["events"][0]["color"], "#0000ff");
}

#[test]
fn test_annotate_add_and_export() {
    let dir = gaze_project();
    let stdout = ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "1020", "--to", "1980"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["begin"], 1000);
    assert_eq!(parsed["end"], 2000);
    assert_eq!(parsed["clamped"], false);

    assert_eq!(
        exported(dir.path()),
        "timeline,label,begin,end,duration,comment\nGaze,Look,1000,2000,1000,\n"
    );
}

#[test]
fn test_annotate_add_is_bounded_by_neighbors() {
    let dir = gaze_project();
    ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "3020", "--to", "3980"]);

    // Starting inside an existing annotation is refused.
    let (_, stderr, code) = run_cli(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "3500", "--to", "4500"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("inside the annotation"));

    // Drawing toward it stops at its start.
    let stdout = ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "1020", "--to", "5000"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["end"], 3000);
    assert_eq!(parsed["clamped"], true);
}

#[test]
fn test_merge_comment_and_delete() {
    let dir = gaze_project();
    ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "1020", "--to", "1980"]);
    // Drawn backwards from 2500; stops where the first one ends.
    let stdout = ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "2500", "--to", "2000"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!((parsed["begin"].as_i64(), parsed["end"].as_i64()), (Some(2000), Some(2480)));

    let stdout = ok(dir.path(), &["annotate", "merge", "Gaze", "1500", "--previous"]);
    assert_eq!(stdout.trim(), "nothing to merge");
    let stdout = ok(dir.path(), &["annotate", "merge", "Gaze", "1500", "--next"]);
    let op: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(op["start_time"], 1000);
    assert_eq!(op["end_time"], 2480);

    ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "4020", "--to", "4980"]);
    ok(dir.path(), &["annotate", "delete", "Gaze", "4500", "--yes"]);

    ok(dir.path(), &["annotate", "comment", "Gaze", "1500", "say \"hi\""]);
    assert_eq!(
        exported(dir.path()),
        "timeline,label,begin,end,duration,comment\nGaze,Look,1000,2480,1480,\"say \\\"\"hi\\\"\"\"\n"
    );

    let (_, stderr, code) = run_cli(dir.path(), &["annotate", "delete", "Gaze", "1500"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));
}

#[test]
fn test_csv_import_reports_skipped_rows() {
    let dir = gaze_project();
    let file = dir.path().join("incoming.csv");
    std::fs::write(
        &file,
        "timeline;label;begin;end;duration;comment\nGaze;Look;0;500;500;\nNonexistent;Look;0;10;10;\nGaze;Blink;0;10;10;\n",
    )
    .unwrap();

    let stdout = ok(dir.path(), &["csv", "import", file.to_str().unwrap()]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["imported"], 1);
    assert_eq!(report["skipped_unknown_timeline"], 1);
    assert_eq!(report["skipped_unknown_label"], 1);
    assert!(exported(dir.path()).contains("Gaze,Look,0,500,500,"));
}

#[test]
fn test_remove_timeline_requires_yes_when_annotated() {
    let dir = gaze_project();
    ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "1020", "--to", "1980"]);

    let (_, _, code) = run_cli(dir.path(), &["timeline", "remove", "Gaze"]);
    assert_eq!(code, 1);
    ok(dir.path(), &["timeline", "remove", "Gaze", "--yes"]);
    let stdout = ok(dir.path(), &["timeline", "list"]);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_config_delimiter_and_coder() {
    let dir = gaze_project();
    ok(dir.path(), &["annotate", "add", "Gaze", "Look", "--from", "1020", "--to", "1980"]);
    ok(dir.path(), &["--coder", "Ada <ada@lab.org>", "config", "set-delimiter", ";"]);

    let csv = std::fs::read_to_string(dir.path().join("annotations.csv")).unwrap();
    assert!(csv.starts_with("timeline;label;begin;end;duration;comment\n"));

    let stdout = ok(dir.path(), &["config", "show"]);
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["csv_delimiter"], ";");
    assert_eq!(config["coders"][0]["name"], "Ada");
    assert_eq!(config["coders"][0]["email"], "ada@lab.org");
}

#[test]
fn test_unknown_timeline_is_an_error() {
    let dir = gaze_project();
    let (_, stderr, code) = run_cli(dir.path(), &["annotate", "add", "Voice", "Look", "--from", "0", "--to", "100"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("No timeline named 'Voice'"));
}
