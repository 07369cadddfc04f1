use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Name of the per-repository config file looked up when none is given.
pub const CONFIG_FILE_NAME: &str = ".untrack.toml";

pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "untrack", version)]
#[command(about = "Find large files in git history and purge them")]
pub struct Cli {
  /// Run as if started in DIR instead of the current directory
  #[arg(short = 'C', value_name = "DIR", global = true)]
  pub repo: Option<PathBuf>,

  /// Config file to load (also UNTRACK_CONFIG; default <repo>/.untrack.toml)
  #[arg(long, value_name = "FILE", global = true)]
  pub config: Option<PathBuf>,

  /// Only print warnings, errors and requested data
  #[arg(short, long, global = true)]
  pub quiet: bool,

  /// Log every git invocation to stderr (same as UNTRACK_DEBUG=1)
  #[arg(long, global = true)]
  pub debug: bool,

  #[command(subcommand)]
  pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
  /// List the largest objects in history, biggest first
  List {
    /// Number of objects to show [default: 10]
    #[arg(short = 'n', value_name = "COUNT", value_parser = parse_count)]
    count: Option<usize>,

    /// Print the objects as a JSON array
    #[arg(long, conflicts_with = "table")]
    json: bool,

    /// Print the objects as a table
    #[arg(long)]
    table: bool,
  },

  /// Remove every path matching the patterns from all of history.
  ///
  /// Follow with `confirm` to make the removal permanent or `reset` to undo it.
  Rm {
    /// Path patterns such as `target/*.zip`
    #[arg(value_name = "PATH-PATTERN", required = true)]
    paths: Vec<String>,

    /// WARNING: remove and confirm in one go, there is no undo
    #[arg(short = 'f', long = "force-remove")]
    force: bool,

    /// Write a git bundle of every ref before rewriting
    #[arg(long)]
    backup: bool,

    /// Where to write the backup bundle (file or directory; implies --backup)
    #[arg(long, value_name = "PATH")]
    backup_path: Option<PathBuf>,
  },

  /// Undo the last unconfirmed rm
  Reset,

  /// Make the last rm permanent: drops backups, expires reflogs, prunes objects
  Confirm,
}

fn parse_count(s: &str) -> std::result::Result<usize, String> {
  match s.parse::<usize>() {
    Ok(0) => Err("count must be at least 1".to_string()),
    Ok(n) => Ok(n),
    Err(_) => Err(format!("'{s}' is not a positive integer")),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat { Lines, Json, Table }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
  pub top: usize,
  pub format: ListFormat,
}

impl Default for ListOptions {
  fn default() -> Self {
    Self { top: DEFAULT_TOP, format: ListFormat::Lines }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RmOptions {
  pub paths: Vec<String>,
  pub force: bool,
  pub backup: bool,
  pub backup_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  List(ListOptions),
  Rm(RmOptions),
  Reset,
  Confirm,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Options {
  pub repo: PathBuf,
  pub quiet: bool,
  pub debug_mode: bool,
  pub command: Command,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      repo: PathBuf::from("."),
      quiet: false,
      debug_mode: false,
      command: Command::List(ListOptions::default()),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileListConfig {
  top: Option<usize>,
  json: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileRmConfig {
  backup: Option<bool>,
  backup_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
  list: Option<FileListConfig>,
  rm: Option<FileRmConfig>,
}

/// Process environment that feeds into option resolution.
#[derive(Debug, Clone, Default)]
pub struct Env {
  pub config: Option<OsString>,
  pub debug: Option<OsString>,
}

impl Env {
  pub fn from_process() -> Self {
    Self {
      config: env::var_os("UNTRACK_CONFIG"),
      debug: env::var_os("UNTRACK_DEBUG"),
    }
  }
}

impl Options {
  /// Layer defaults, the config file and the command line, in that order.
  pub fn resolve(cli: Cli, env: &Env) -> Result<Self> {
    let repo = cli.repo.unwrap_or_else(|| PathBuf::from("."));
    let debug_mode = cli.debug
      || env
        .debug
        .as_ref()
        .is_some_and(|v| debug_env_flag_enabled(&v.to_string_lossy()));

    let (config_path, explicit) = match (cli.config, env.config.as_ref()) {
      (Some(path), _) => (path, true),
      (None, Some(path)) if !path.is_empty() => (PathBuf::from(path), true),
      _ => (repo.join(CONFIG_FILE_NAME), false),
    };
    let file = load_config(&config_path, explicit)?;

    let command = match cli.command {
      CliCommand::List { count, json, table } => {
        let mut list = ListOptions::default();
        if let Some(cfg) = file.list {
          if let Some(top) = cfg.top {
            list.top = top.max(1);
          }
          if cfg.json == Some(true) {
            list.format = ListFormat::Json;
          }
        }
        if let Some(count) = count {
          list.top = count;
        }
        if json {
          list.format = ListFormat::Json;
        } else if table {
          list.format = ListFormat::Table;
        }
        Command::List(list)
      }
      CliCommand::Rm { paths, force, backup, backup_path } => {
        let mut rm = RmOptions { paths, force, ..RmOptions::default() };
        if let Some(cfg) = file.rm {
          rm.backup = cfg.backup.unwrap_or(false);
          rm.backup_path = cfg.backup_path;
        }
        if backup {
          rm.backup = true;
        }
        if backup_path.is_some() {
          rm.backup = true;
          rm.backup_path = backup_path;
        }
        Command::Rm(rm)
      }
      CliCommand::Reset => Command::Reset,
      CliCommand::Confirm => Command::Confirm,
    };

    Ok(Options { repo, quiet: cli.quiet, debug_mode, command })
  }
}

fn load_config(path: &Path, explicit: bool) -> Result<FileConfig> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
      return Ok(FileConfig::default());
    }
    Err(err) => {
      return Err(Error::Config { path: path.to_path_buf(), message: err.to_string() });
    }
  };
  tracing::debug!(path = %path.display(), "loading config");
  toml::from_str(&raw).map_err(|err| Error::Config {
    path: path.to_path_buf(),
    message: err.to_string(),
  })
}

fn debug_env_flag_enabled(raw: &str) -> bool {
  let normalized = raw.trim().to_ascii_lowercase();
  if normalized.is_empty() {
    return false;
  }
  !matches!(normalized.as_str(), "0" | "false" | "no" | "off")
}

/// Parse the process arguments and environment into [`Options`].
pub fn parse_args() -> Result<Options> {
  Options::resolve(Cli::parse(), &Env::from_process())
}
