//! E2E tests for `coh bin` and `coh completions`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn coh_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("coh"));
    cmd.env("COHESION_LOG", "off");
    cmd.env_remove("FORMAT");
    cmd
}

const THREE_EVENTS: &str = "id\ttime,x,y\n1\t0,0,0\n1\t14,0,250\n1\t70,0,0\n";

#[test]
fn bin_reads_stdin_and_dumps_grid() {
    let output = coh_cmd()
        .args(["bin", "--format", "text"])
        .write_stdin(THREE_EVENTS)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 57);
    assert_eq!(lines[0], "0,0\t3");
    assert_eq!(lines[11 + 2], "1,2\t2");
    assert_eq!(lines[44], "4,0\t2");
    assert_eq!(lines[46], "4,2\t2");
    assert_eq!(lines[55], "max_dist\t250");
    assert_eq!(lines[56], "max_time\t70");
}

#[test]
fn bin_reads_input_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.tsv");
    fs::write(&path, "1\t0,0,0\n2\t0,0,0\n").unwrap();

    coh_cmd()
        .args(["bin", "--format", "text", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_time").count(2));
}

#[test]
fn bin_json_emits_one_report_per_line() {
    let output = coh_cmd()
        .args(["bin", "--json"])
        .write_stdin("1\t0,0,0\n1\t0,30,40\n2\t0,0,0\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Vec<Value> = output
        .stdout
        .split(|&b| b == b'\n')
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_slice(l).unwrap())
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["size"], 2);
    assert_eq!(reports[0]["grid"][0][0], 4);
    assert_eq!(reports[1]["maxima"]["max_dist"], 50.0);
}

#[test]
fn bin_malformed_row_fails_with_code() {
    coh_cmd()
        .args(["bin", "--format", "text"])
        .write_stdin("1\t0,0,0\n1\t0,0\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E6001").and(predicate::str::contains("line 2")));
}

#[test]
fn completions_generate_for_bash() {
    coh_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coh"));
}

#[test]
fn completions_cover_subcommands() {
    coh_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze").and(predicate::str::contains("--directory")));
}
