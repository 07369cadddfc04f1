use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::gitutil::Git;

/// Write every ref of the repository into a git bundle before a rewrite.
///
/// `requested` may name a directory (the bundle gets a timestamped name inside
/// it) or a file; relative paths are taken from the repository root. Without
/// it the bundle lands in `<git-dir>/untrack/`.
pub fn create_backup(git: &Git, requested: Option<&Path>) -> Result<PathBuf> {
  let bundle_path = bundle_path(git, requested, &bundle_name(OffsetDateTime::now_utc())?)?;

  git.run(&["bundle", "create", &bundle_path.to_string_lossy(), "--all"])?;
  tracing::debug!(path = %bundle_path.display(), "backup bundle written");
  Ok(bundle_path)
}

fn bundle_name(now: OffsetDateTime) -> Result<String> {
  const FORMAT: &[FormatItem<'_>] =
    format_description!("[year][month][day]-[hour][minute][second]-[subsecond digits:9]");
  let formatted = now
    .format(FORMAT)
    .map_err(|e| Error::invalid_options(format!("failed to format backup timestamp: {e}")))?;
  Ok(format!("backup-{formatted}.bundle"))
}

fn bundle_path(git: &Git, requested: Option<&Path>, bundle_name: &str) -> Result<PathBuf> {
  let path = match requested {
    Some(path) => {
      let resolved = if path.is_absolute() {
        path.to_path_buf()
      } else {
        git.repo().join(path)
      };
      if resolved.is_dir() || resolved.extension().is_none() {
        fs::create_dir_all(&resolved)?;
        resolved.join(bundle_name)
      } else {
        if let Some(parent) = resolved.parent() {
          if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
          }
        }
        resolved
      }
    }
    None => {
      let dest = git.git_dir()?.join("untrack");
      fs::create_dir_all(&dest)?;
      dest.join(bundle_name)
    }
  };
  // git bundle runs inside the repository; hand it a path that survives that.
  if path.is_absolute() {
    Ok(path)
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use time::macros::datetime;

  #[test]
  fn bundle_name_is_sortable_timestamp() {
    let name = bundle_name(datetime!(2024-03-05 7:08:09.000000123 UTC)).unwrap();
    assert_eq!(name, "backup-20240305-070809-000000123.bundle");
  }

  #[test]
  fn directory_like_request_gets_default_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let git = Git::new(dir.path());
    let path = bundle_path(&git, Some(Path::new("backups")), "b.bundle").unwrap();
    assert_eq!(path, dir.path().join("backups").join("b.bundle"));
    assert!(dir.path().join("backups").is_dir());
  }

  #[test]
  fn file_request_is_used_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let git = Git::new(dir.path());
    let path = bundle_path(&git, Some(Path::new("out/before.bundle")), "b.bundle").unwrap();
    assert_eq!(path, dir.path().join("out").join("before.bundle"));
    assert!(dir.path().join("out").is_dir());
  }
}
