mod common;
use common::*;

#[test]
fn help_lists_all_commands() {
    let output = cli_command().arg("--help").output().expect("run untrack --help");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    for cmd in ["list", "rm", "reset", "confirm"] {
        assert!(stdout.contains(cmd), "help should mention {cmd}");
    }
}

#[test]
fn rm_help_warns_about_force() {
    let output = cli_command().args(["rm", "--help"]).output().expect("run rm --help");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("--force-remove"));
    assert!(stdout.contains("no undo"));
}

#[test]
fn zero_count_is_a_usage_error() {
    let repo = init_empty_repo();
    let out = run_cli(repo.path(), &["list", "-n", "0"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn broken_config_is_a_usage_error() {
    let repo = init_empty_repo();
    write_file(repo.path(), ".untrack.toml", b"[list\n");
    let out = run_cli(repo.path(), &["list"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr_of(&out).contains(".untrack.toml"));
}

#[test]
fn quiet_suppresses_info_but_not_warnings() {
    let repo = init_repo_with_large_files();
    let out = run_cli(repo.path(), &["-q", "reset"]);
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "");
    assert!(stderr_of(&out).contains("nothing to reset"));
}

#[test]
fn debug_mode_logs_git_invocations() {
    let repo = init_repo_with_large_files();
    let out = run_cli(repo.path(), &["--debug", "list", "-n", "1"]);
    assert!(out.status.success());
    assert!(stderr_of(&out).contains("verify-pack"), "{}", stderr_of(&out));
}
