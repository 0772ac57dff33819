//! Runs the `isx` binary end to end.

use std::process::Command;
use tempfile::TempDir;

fn isx() -> Command {
    Command::new(env!("CARGO_BIN_EXE_isx"))
}

#[test]
fn test_complete_prints_items() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("Program.cs"),
        "using System.Collections.Generic;\nclass P { void M(List<int> xs) { xs.Wh } }\n",
    )
    .unwrap();

    let output = isx()
        .current_dir(temp.path())
        .args(["complete", "Program.cs", "--after", "xs.Wh", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let labels: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["label"].as_str())
        .collect();
    assert!(labels.iter().all(|label| *label == "Where<>"));
    assert!(!labels.is_empty());
}

#[test]
fn test_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let output = isx()
        .current_dir(temp.path())
        .args(["complete", "Missing.cs", "--offset", "0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read source file"));
}

#[test]
fn test_logging_goes_to_stderr() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("Program.cs"), "class P { }\n").unwrap();
    let output = isx()
        .current_dir(temp.path())
        .env("ISX_LOG", "debug")
        .args(["complete", "Program.cs", "--offset", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}
