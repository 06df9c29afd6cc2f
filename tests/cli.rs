//! Binary-level tests for the CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;

fn plsof() -> Command {
    Command::cargo_bin("plsof").unwrap()
}

/// A PID no live process can own; keeps the scan's output deterministic
/// on any host.
const NO_SUCH_PID: &str = "4294967295";

#[test]
fn help_lists_the_filter_options() {
    plsof()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pid"))
        .stdout(predicate::str::contains("--command"))
        .stdout(predicate::str::contains("--filter"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn help_carries_usage_examples() {
    plsof()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn invalid_regex_is_a_usage_error() {
    plsof()
        .args(["-f", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("regex"));
}

#[test]
fn zero_timeout_is_rejected() {
    plsof().args(["-t", "0"]).assert().failure();
}

#[test]
fn unknown_flags_are_rejected() {
    plsof().arg("--frobnicate").assert().failure();
}

#[test]
fn empty_result_prints_the_placeholder_line() {
    plsof()
        .args(["-p", NO_SUCH_PID])
        .assert()
        .success()
        .stdout(predicate::str::contains("No open handles found."));
}

#[test]
fn empty_result_in_json_is_an_empty_array() {
    plsof()
        .args(["-p", NO_SUCH_PID, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn json_mode_keeps_stdout_parseable() {
    let assert = plsof().args(["-p", NO_SUCH_PID, "--json"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.is_array());
}
