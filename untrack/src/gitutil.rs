//! Thin synchronous wrapper around the `git` binary.
//!
//! Every interaction with the repository goes through [`Git`]: run an argv,
//! capture stdout/stderr, and turn a non-zero exit into [`Error::Command`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Error, Result};

/// Captured result of a finished git invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A handle on the repository the tool was pointed at.
#[derive(Debug, Clone)]
pub struct Git {
    repo: PathBuf,
}

impl Git {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Run git and fail on a non-zero exit.
    pub fn run(&self, args: &[&str]) -> Result<RunOutput> {
        self.run_with(args, &[], None)
    }

    /// Run git, feeding `input` on stdin, and fail on a non-zero exit.
    pub fn run_with_input(&self, args: &[&str], input: &[u8]) -> Result<RunOutput> {
        self.run_with(args, &[], Some(input))
    }

    /// Run git with extra environment variables and fail on a non-zero exit.
    pub fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<RunOutput> {
        self.run_with(args, envs, None)
    }

    /// Run git and hand back the output whatever the exit status.
    ///
    /// Only a failure to launch the process is an error here.
    pub fn try_run(&self, args: &[&str]) -> Result<RunOutput> {
        self.exec(args, &[], None)
    }

    /// Absolute path of the repository's metadata directory.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let out = self.run(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(out.stdout.trim()))
    }

    /// Whether `refname` resolves to an object.
    pub fn ref_exists(&self, refname: &str) -> Result<bool> {
        let out = self.try_run(&["rev-parse", "--verify", "--quiet", refname])?;
        Ok(out.success())
    }

    fn run_with(
        &self,
        args: &[&str],
        envs: &[(&str, &str)],
        input: Option<&[u8]>,
    ) -> Result<RunOutput> {
        let out = self.exec(args, envs, input)?;
        if out.success() {
            Ok(out)
        } else {
            Err(Error::Command {
                command: display_command(args),
                code: out.code(),
                stderr: out.stderr,
            })
        }
    }

    fn exec(
        &self,
        args: &[&str],
        envs: &[(&str, &str)],
        input: Option<&[u8]>,
    ) -> Result<RunOutput> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        tracing::debug!(repo = %self.repo.display(), "running {}", display_command(args));
        let spawn_err = |source| Error::Spawn {
            command: display_command(args),
            source,
        };
        let mut child = cmd.spawn().map_err(spawn_err)?;
        if let Some(bytes) = input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(bytes)?;
            }
        }
        let output = child.wait_with_output().map_err(spawn_err)?;
        tracing::debug!(status = %output.status, "finished {}", display_command(args));

        Ok(RunOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn display_command(args: &[&str]) -> String {
    let mut s = String::from("git");
    for arg in args {
        s.push(' ');
        s.push_str(arg);
    }
    s
}

/// Quote `s` for a POSIX shell so it reaches the command as one literal word.
pub fn shell_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_wraps_plain_words() {
        assert_eq!(shell_quote("target/*.zip"), "'target/*.zip'");
        assert_eq!(shell_quote("with space"), "'with space'");
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn display_command_joins_argv() {
        assert_eq!(
            display_command(&["reflog", "expire", "--expire=now", "--all"]),
            "git reflog expire --expire=now --all"
        );
    }

    #[test]
    fn missing_directory_is_a_spawn_failure() {
        let git = Git::new("/definitely/not/a/real/dir");
        match git.try_run(&["status"]) {
            Err(Error::Spawn { command, .. }) => assert_eq!(command, "git status"),
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }
}
