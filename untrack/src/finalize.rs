//! Settling a pending rewrite: either make it permanent or roll it back.
//!
//! Whether a rewrite is pending is decided solely by the refs under
//! `refs/original/`; nothing is remembered between invocations.

use crate::error::{Error, Result};
use crate::gitutil::Git;
use crate::rewrite::BACKUP_NAMESPACE;

/// Delete the backup refs, expire every reflog entry and prune unreachable
/// objects. The purged objects are gone for good once this returns.
pub fn confirm(git: &Git) -> Result<()> {
    let deletions = git
        .run(&[
            "for-each-ref",
            "--format=delete %(refname)",
            BACKUP_NAMESPACE,
        ])?
        .stdout;
    tracing::debug!(refs = deletions.lines().count(), "deleting backup refs");
    git.run_with_input(&["update-ref", "--stdin"], deletions.as_bytes())?;
    git.run(&["reflog", "expire", "--expire=now", "--all"])?;
    git.run(&["gc", "--prune=now", "--quiet"])?;
    Ok(())
}

/// The checked-out branch, or `None` when HEAD is detached or unborn.
pub fn current_branch(git: &Git) -> Result<Option<String>> {
    let out = git.try_run(&["symbolic-ref", "--short", "-q", "HEAD"])?;
    let current = out.stdout.trim();
    if out.success() && !current.is_empty() {
        Ok(Some(current.to_string()))
    } else {
        Ok(None)
    }
}

pub fn backup_ref_for(branch: &str) -> String {
    format!("{BACKUP_NAMESPACE}/refs/heads/{branch}")
}

/// `<oid> <refname>` for every ref under the backup namespace.
fn list_backups(git: &Git) -> Result<String> {
    Ok(git
        .run(&[
            "for-each-ref",
            "--format=%(objectname) %(refname)",
            BACKUP_NAMESPACE,
        ])?
        .stdout)
}

fn lists_ref(backups: &str, refname: &str) -> bool {
    backups
        .lines()
        .filter_map(|line| line.trim().split_once(' '))
        .any(|(_, name)| name == refname)
}

/// Build the `update-ref --stdin` script that moves every backed-up ref back
/// and removes the backups. Input lines are `<oid> <refname>`.
fn restore_script(backups: &str) -> String {
    let prefix = format!("{BACKUP_NAMESPACE}/");
    let mut script = String::new();
    for line in backups.lines() {
        let Some((oid, refname)) = line.trim().split_once(' ') else {
            continue;
        };
        let Some(original) = refname.strip_prefix(&prefix) else {
            continue;
        };
        script.push_str(&format!("update {original} {oid}\n"));
        script.push_str(&format!("delete {refname}\n"));
    }
    script
}

/// Undo an unconfirmed `rm`: put every backed-up ref back and drop the
/// backups.
///
/// The working tree is hard-reset only when the checked-out branch has a
/// backup of its own; HEAD is never moved onto another branch's backup.
/// Fails with [`Error::NoBackupToRestore`] without touching anything when
/// nothing is stored under `refs/original/`.
pub fn reset(git: &Git) -> Result<()> {
    let backups = list_backups(git)?;
    let script = restore_script(&backups);
    if script.is_empty() {
        return Err(Error::NoBackupToRestore {
            namespace: BACKUP_NAMESPACE.to_string(),
        });
    }

    match current_branch(git)?.map(|branch| backup_ref_for(&branch)) {
        Some(head_backup) if lists_ref(&backups, &head_backup) => {
            git.run(&["reset", "--hard", &head_backup])?;
        }
        Some(head_backup) => {
            tracing::debug!(%head_backup, "checked-out branch was not rewritten; working tree left alone");
        }
        None => tracing::debug!("HEAD is detached; working tree left alone"),
    }

    git.run_with_input(&["update-ref", "--stdin"], script.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_ref_lives_under_original_namespace() {
        assert_eq!(backup_ref_for("main"), "refs/original/refs/heads/main");
        assert_eq!(
            backup_ref_for("feature/x"),
            "refs/original/refs/heads/feature/x"
        );
    }

    #[test]
    fn restore_script_moves_refs_back_and_drops_backups() {
        let a = "a".repeat(40);
        let b = "b".repeat(40);
        let listing = format!(
            "{a} refs/original/refs/heads/main\n{b} refs/original/refs/tags/v1\n{b} refs/heads/stray\n"
        );
        assert_eq!(
            restore_script(&listing),
            format!(
                "update refs/heads/main {a}\ndelete refs/original/refs/heads/main\n\
                 update refs/tags/v1 {b}\ndelete refs/original/refs/tags/v1\n"
            )
        );
    }

    #[test]
    fn backup_lookup_matches_whole_ref_names() {
        let a = "a".repeat(40);
        let listing = format!("{a} refs/original/refs/heads/main-old\n{a} refs/original/refs/heads/x\n");
        assert!(lists_ref(&listing, "refs/original/refs/heads/x"));
        assert!(!lists_ref(&listing, "refs/original/refs/heads/main"));
        assert!(!lists_ref("", "refs/original/refs/heads/main"));
    }

    #[test]
    fn restore_script_of_nothing_is_empty() {
        assert_eq!(restore_script(""), "");
    }
}
