//! End-to-end tests for the `chai` binary against a temporary space.

use assert_cmd::Command;
use predicates::prelude::*;

fn chai(space: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("chai").expect("chai binary");
    cmd.env("CHAI_SPACE", space);
    cmd.env_remove("FORMAT");
    cmd
}

#[test]
fn add_then_list_shows_the_task() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["add", "water", "plants", "--due", "2030-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("water-plants"));

    chai(dir.path())
        .args(["list", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("water-plants"))
        .stdout(predicate::str::contains("due 2030-06-01"));

    assert!(dir.path().join("todos.jsonl").exists());
}

#[test]
fn invalid_due_date_fails_with_hint() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["add", "pay rent", "--due", "June 1st"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid due date"))
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn invalid_recurrence_fails_with_code() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["add", "stretch", "--every", "fortnightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid recurrence rule"))
        .stderr(predicate::str::contains("E2004"));
}

#[test]
fn done_completes_and_moves_to_done_list() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path()).args(["add", "file taxes"]).assert().success();

    chai(dir.path())
        .args(["done", "file-taxes", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: file taxes"));

    chai(dir.path())
        .args(["list", "--done", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file-taxes"));

    chai(dir.path())
        .args(["list", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

#[test]
fn done_recurring_reports_successor_from_stored_due_date() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args([
            "add",
            "water plants",
            "--due",
            "2024-01-01",
            "--every",
            "7 days",
        ])
        .assert()
        .success();

    // Completed years late; cadence still anchors on the stored due date.
    chai(dir.path())
        .args(["done", "water-plants", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("due 2024-01-08"));
}

#[test]
fn done_twice_fails_with_already_done() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path()).args(["add", "one shot"]).assert().success();
    chai(dir.path()).args(["done", "one-shot"]).assert().success();

    chai(dir.path())
        .args(["done", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already done"))
        .stderr(predicate::str::contains("E2003"));
}

#[test]
fn ambiguous_prefix_lists_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path()).args(["add", "fix bug"]).assert().success();
    chai(dir.path()).args(["add", "fix bug 2"]).assert().success();

    chai(dir.path())
        .args(["show", "fix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous"))
        .stderr(predicate::str::contains("fix-bug"))
        .stderr(predicate::str::contains("fix-bug-2"));

    // The exact slug still resolves cleanly.
    chai(dir.path())
        .args(["show", "fix-bug", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fix bug"));
}

#[test]
fn next_is_bounded_and_never_errors_when_empty() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending tasks found."));

    chai(dir.path()).args(["add", "only task"]).assert().success();

    let output = chai(dir.path())
        .args(["next", "-n", "3", "--format", "text"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8");
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("only-task"));
}

#[test]
fn overdue_task_is_recommended_first_with_reason() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["add", "someday maybe"])
        .assert()
        .success();
    chai(dir.path())
        .args(["add", "overdue report", "--due", "2020-01-01"])
        .assert()
        .success();

    let output = chai(dir.path())
        .args(["next", "--format", "text"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8");
    let first = stdout.lines().next().expect("one line");
    assert!(first.contains("overdue-report"));
    assert!(first.contains("overdue by"));
}

#[test]
fn json_output_is_machine_readable() {
    let dir = tempfile::tempdir().expect("tempdir");

    chai(dir.path())
        .args(["add", "water plants", "--json"])
        .assert()
        .success();

    let output = chai(dir.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    let tasks = value["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["slug"], "water-plants");
    assert_eq!(tasks[0]["status"], "open");
}
