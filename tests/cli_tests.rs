#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_rejects_dependency_cycles() {
    run_cli("task A 5\ntask B 3\ntask C 2\ndep 1 2\ndep 2 3\ndep 3 1\nquit\n")
        .success()
        .stdout(str_contains("Task 1 now precedes task 2."))
        .stdout(str_contains(
            "Error: task 3 cannot precede task 1: dependency cycle",
        ));
}

#[test]
fn cli_reports_critical_path() {
    run_cli("task A 5\ntask B 3\ntask C 2\ndep 1 2\ndep 2 3\ncp\nquit\n")
        .success()
        .stdout(str_contains("project_duration=10"))
        .stdout(str_contains("critical_path=1->2->3"));
}

#[test]
fn cli_delete_command_removes_task() {
    run_cli("task Keep 2\ntask Drop 1\ndelete 2\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Deleted task 2 (Drop)."))
        .stdout(str_contains("Error: task 2 not found"));
}

#[test]
fn cli_assignment_reports_hours_and_availability() {
    run_cli(
        "task Build 5 2025-01-06\nresource Ana 40 1.0\nassign 1 1 0.5 2025-01-06 2025-01-10\navail 1 2025-01-08\nunassign 1 1\navail 1 2025-01-08\nquit\n",
    )
    .success()
    .stdout(str_contains("Created assignment id=1 hours=20.0"))
    .stdout(str_contains("availability=0.50"))
    .stdout(str_contains("Removed 1 assignment(s)."))
    .stdout(str_contains("availability=1.00"));
}

#[test]
fn cli_undo_restores_previous_state() {
    let assert = run_cli("task A 1\ntask B 1\nundo\ncp\nundo\nundo\nquit\n").success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Undone."));
    assert!(output.contains("tasks=1,"), "one task after undo:\n{output}");
    assert!(output.contains("Nothing to undo."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "project Persisted\ntask Keep 4\nsave {path}\ntask Temp 1\nload {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Loaded 'Persisted' (1 tasks, 0 resources)."));
    let after_reload = output.split("Loaded 'Persisted'").last().unwrap_or_default();
    assert!(after_reload.contains("Keep"));
    assert!(
        !after_reload.contains("Temp"),
        "temporary task should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn cli_rejected_commands_leave_undo_history_alone() {
    let assert = run_cli(
        "task A 1\ntask B 1\ndep 1 2\ndep 2 1\ndelete 9\nundo\ncp\nundo\ncp\nquit\n",
    )
    .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("dependency cycle"));
    // the first undo reverts the accepted dependency, not the rejected ones
    assert!(output.contains("project_duration=1,"), "edge undone:\n{output}");
    assert!(output.contains("tasks=1,"), "second task undone:\n{output}");
}

#[test]
fn cli_skills_and_overrides_can_be_removed() {
    run_cli(
        "resource Ana 40 1.0\nskill 1 rust\nunskill 1 rust\nunskill 1 rust\noverride 1 2025-01-11 0.5\navail 1 2025-01-11\nunoverride 1 2025-01-11\navail 1 2025-01-11\nunoverride 1 2025-01-11\nresources\nquit\n",
    )
    .success()
    .stdout(str_contains("Resource 1 no longer has skill 'rust'."))
    .stdout(str_contains("Resource 1 has no skill 'rust'."))
    .stdout(str_contains("availability=0.50"))
    .stdout(str_contains("Resource 1 availability on 2025-01-11 cleared."))
    .stdout(str_contains("availability=0.00"))
    .stdout(str_contains("Resource 1 has no override on 2025-01-11."));
}
