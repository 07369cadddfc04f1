//! Destructive history rewrite that strips paths from every commit.

use crate::error::{Error, Result};
use crate::finalize;
use crate::gitutil::{shell_quote, Git, RunOutput};

/// Namespace git filter-branch saves the pre-rewrite refs under.
pub const BACKUP_NAMESPACE: &str = "refs/original";

/// Index-filter shell command removing `paths` from the index of a commit.
///
/// Patterns are single-quoted so globs are expanded by git's pathspec
/// matching rather than by the shell.
pub fn index_filter_command(paths: &[String]) -> String {
    let mut cmd = String::from("git rm -r -f -q --cached --ignore-unmatch --");
    for path in paths {
        cmd.push(' ');
        cmd.push_str(&shell_quote(path));
    }
    cmd
}

/// Rewrite all refs so that no commit contains a path matching `paths`.
///
/// The previous refs are left under [`BACKUP_NAMESPACE`] for `reset`. With
/// `confirm_immediately` they are deleted and the old objects collected
/// straight away, which cannot be undone.
pub fn remove_from_history(
    git: &Git,
    paths: &[String],
    confirm_immediately: bool,
) -> Result<RunOutput> {
    if paths.is_empty() {
        return Err(Error::invalid_options("rm needs at least one path pattern"));
    }
    let filter = index_filter_command(paths);
    let out = git.run_with_env(
        &[
            "filter-branch",
            "-f",
            "--prune-empty",
            "--index-filter",
            &filter,
            "--tag-name-filter",
            "cat",
            "--",
            "--all",
        ],
        &[("FILTER_BRANCH_SQUELCH_WARNING", "1")],
    )?;

    if confirm_immediately {
        finalize::confirm(git)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_command_quotes_each_pattern() {
        let cmd = index_filter_command(&["*.zip".to_string(), "my dir/it's.bin".to_string()]);
        assert_eq!(
            cmd,
            "git rm -r -f -q --cached --ignore-unmatch -- '*.zip' 'my dir/it'\\''s.bin'"
        );
    }

    #[test]
    fn empty_pattern_list_is_rejected_before_running_git() {
        let git = Git::new("/definitely/not/a/real/dir");
        match remove_from_history(&git, &[], false) {
            Err(Error::InvalidOptions(msg)) => assert!(msg.contains("path pattern")),
            other => panic!("expected invalid options, got {other:?}"),
        }
    }
}
