use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

#[allow(dead_code)]
pub fn cli_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_untrack"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("UNTRACK_CONFIG");
    cmd.env_remove("UNTRACK_DEBUG");
    cmd
}

#[allow(dead_code)]
pub fn run_cli(dir: &Path, args: &[&str]) -> Output {
    cli_command()
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run untrack")
}

pub fn run_git(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let out = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run git");
    let code = out.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    (code, stdout, stderr)
}

pub fn write_file(dir: &Path, rel: &str, contents: &[u8]) {
    let path = dir.join(rel);
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(contents).unwrap();
}

/// A repository with identity configured and no commits.
pub fn init_empty_repo() -> TempDir {
    let repo = tempfile::tempdir().expect("create temp dir");
    let (c, _o, e) = run_git(repo.path(), &["init", "-q"]);
    assert_eq!(c, 0, "git init failed: {}", e);
    assert_eq!(
        run_git(repo.path(), &["config", "user.name", "A U Thor"]).0,
        0,
        "failed to set user.name"
    );
    assert_eq!(
        run_git(repo.path(), &["config", "user.email", "a.u.thor@example.com"]).0,
        0,
        "failed to set user.email"
    );
    repo
}

#[allow(dead_code)]
pub fn commit_all(repo: &Path, message: &str) {
    assert_eq!(run_git(repo, &["add", "-A"]).0, 0, "git add failed");
    let (c, _o, e) = run_git(repo, &["commit", "-q", "-m", message]);
    assert_eq!(c, 0, "git commit failed: {}", e);
}

/// Repository whose history holds a 200 KiB and a 50 KiB blob next to a
/// small README, plus a later commit touching only the README.
#[allow(dead_code)]
pub fn init_repo_with_large_files() -> TempDir {
    let repo = init_empty_repo();
    write_file(repo.path(), "README.md", b"hello");
    write_file(repo.path(), "assets/big.bin", &vec![b'x'; 200 * 1024]);
    write_file(repo.path(), "medium.bin", &vec![b'y'; 50 * 1024]);
    commit_all(repo.path(), "add assets");
    write_file(repo.path(), "README.md", b"hello again");
    commit_all(repo.path(), "touch readme");
    repo
}

#[allow(dead_code)]
pub fn ref_listing(repo: &Path) -> String {
    run_git(repo, &["for-each-ref", "--format=%(objectname) %(refname)"]).1
}

#[allow(dead_code)]
pub fn reachable_objects(repo: &Path) -> String {
    run_git(repo, &["rev-list", "--objects", "--all"]).1
}

#[allow(dead_code)]
pub fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

#[allow(dead_code)]
pub fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}
