use std::io;
use std::path::PathBuf;

/// Top-level error type for untrack operations.
///
/// The two "absence" conditions of the `list` pipeline (no pack objects, an
/// object with no path) are not represented here: they surface as `None` or
/// empty fields instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The working directory is not the top level of a Git repository.
    #[error("{} is not the top level of a git repository", path.display())]
    NotARepository { path: PathBuf },

    /// `reset` was requested but no backup ref from a previous `rm` exists.
    #[error("nothing to reset: no backup refs under {namespace}")]
    NoBackupToRestore { namespace: String },

    /// Git ran but exited unsuccessfully.
    #[error("`{command}` failed ({}){}", exit_label(*code), stderr_suffix(stderr))]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Git could not be launched at all.
    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to encode JSON output")]
    Json(#[from] serde_json::Error),

    #[error("failed to load config at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{0}")]
    InvalidOptions(String),
}

impl Error {
    /// Convenience constructor for invalid option failures.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Error::InvalidOptions(msg.into())
    }

    /// True for failures that should be reported as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::NoBackupToRestore { .. })
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

/// Convenience result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
