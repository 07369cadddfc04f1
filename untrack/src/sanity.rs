//! Repository guard run before every command.
//!
//! History rewriting is only attempted from the top level of a non-bare
//! repository: `git status` must succeed there and the directory must
//! directly contain `.git`. Running from a subdirectory is refused even though
//! git itself would accept it, because `rm` patterns are interpreted relative
//! to the top level by the index filter.

use crate::error::{Error, Result};
use crate::gitutil::Git;

/// Returns true iff the handle points at the top level of a repository.
///
/// Never fails: any "not a repository" answer from git, and any failure to
/// launch git at all, is reported as `false`.
pub fn is_top_level_repository(git: &Git) -> bool {
    match git.try_run(&["status", "--porcelain"]) {
        Ok(out) if out.success() => {}
        Ok(out) => {
            tracing::debug!(stderr = %out.stderr.trim(), "git status rejected the directory");
            return false;
        }
        Err(err) => {
            tracing::debug!("git status could not run: {err}");
            return false;
        }
    }
    git.repo().join(".git").exists()
}

/// Turn a failed guard into [`Error::NotARepository`].
pub fn ensure_top_level(git: &Git) -> Result<()> {
    if is_top_level_repository(git) {
        Ok(())
    } else {
        Err(Error::NotARepository {
            path: git.repo().to_path_buf(),
        })
    }
}
