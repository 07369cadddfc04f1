//! Discovery and ranking of the largest objects stored in the repository.
//!
//! The pipeline is:
//!
//! 1. locate `objects/pack/*.idx`, running `git gc` once if there are none;
//! 2. `git verify-pack -v` over every index;
//! 3. keep only the per-object lines ([`parse_pack_record`]);
//! 4. stable sort by size, largest first, and keep the top N ([`rank`]);
//! 5. join each survivor with a path from `git rev-list --objects --all`
//!    ([`resolve_names`]).
//!
//! Only [`parse_pack_record`] knows the shape of verify-pack output.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::format;
use crate::gitutil::Git;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "commit" => Some(ObjectKind::Commit),
            "tree" => Some(ObjectKind::Tree),
            "blob" => Some(ObjectKind::Blob),
            "tag" => Some(ObjectKind::Tag),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object line of `git verify-pack -v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackObjectRecord {
    pub oid: String,
    pub kind: ObjectKind,
    pub size: u64,
    pub size_in_pack: u64,
    pub offset: u64,
}

/// An object that made it into the top N, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedObject {
    pub oid: String,
    pub kind: ObjectKind,
    pub size: u64,
    pub size_in_pack: u64,
}

impl From<PackObjectRecord> for RankedObject {
    fn from(rec: PackObjectRecord) -> Self {
        Self {
            oid: rec.oid,
            kind: rec.kind,
            size: rec.size,
            size_in_pack: rec.size_in_pack,
        }
    }
}

/// A ranked object joined with the path it was committed under, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedObject {
    #[serde(flatten)]
    pub object: RankedObject,
    pub path: Option<String>,
}

impl ResolvedObject {
    /// Path when known, object id otherwise.
    pub fn name(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.object.oid)
    }

    /// `"<name-or-hash> <size> KB"`, where size is in KiB rounded up and
    /// grouped by thousands (see [`format::kib`]).
    pub fn display_record(&self) -> String {
        format!("{} {} KB", self.name(), format::kib(self.object.size))
    }
}

fn pack_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9a-f]{40}) +(commit|tree|blob|tag) +(\d+) +(\d+) +(\d+)(?: |$)")
            .unwrap_or_else(|e| panic!("invalid verify-pack pattern: {e}"))
    })
}

/// Parse a single verify-pack line; anything that is not an object line
/// (pack summaries, chain-length histograms, `ok` trailers) yields `None`.
pub fn parse_pack_record(line: &str) -> Option<PackObjectRecord> {
    let caps = pack_line_regex().captures(line.trim_end())?;
    Some(PackObjectRecord {
        oid: caps[1].to_string(),
        kind: ObjectKind::parse(&caps[2])?,
        size: caps[3].parse().ok()?,
        size_in_pack: caps[4].parse().ok()?,
        offset: caps[5].parse().ok()?,
    })
}

pub fn parse_verify_pack(output: &str) -> Vec<PackObjectRecord> {
    output.lines().filter_map(parse_pack_record).collect()
}

/// Keep the `n` largest records, largest first. Equal sizes keep their
/// original relative order.
pub fn rank(mut records: Vec<PackObjectRecord>, n: usize) -> Vec<RankedObject> {
    records.sort_by(|a, b| b.size.cmp(&a.size));
    records.truncate(n);
    records.into_iter().map(RankedObject::from).collect()
}

/// All `*.idx` files in the repository's pack directory, sorted by name.
pub fn find_pack_indexes(git: &Git) -> Result<Vec<PathBuf>> {
    let pack_dir = git.git_dir()?.join("objects").join("pack");
    let entries = match fs::read_dir(&pack_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut indexes = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("idx") {
            indexes.push(path);
        }
    }
    indexes.sort();
    Ok(indexes)
}

/// The `n` largest packed objects.
///
/// Returns `Ok(None)` when verify-pack fails without producing any object
/// lines, and an empty list when the repository has nothing to pack.
pub fn find_largest(git: &Git, n: usize) -> Result<Option<Vec<RankedObject>>> {
    let mut indexes = find_pack_indexes(git)?;
    if indexes.is_empty() {
        tracing::debug!("no pack indexes found; running git gc to create one");
        git.run(&["gc", "--quiet"])?;
        indexes = find_pack_indexes(git)?;
    }
    if indexes.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let idx_args: Vec<String> = indexes
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let mut args = vec!["verify-pack", "-v"];
    args.extend(idx_args.iter().map(String::as_str));
    let out = git.try_run(&args)?;
    let records = parse_verify_pack(&out.stdout);
    if !out.success() {
        if records.is_empty() {
            tracing::debug!(stderr = %out.stderr.trim(), "verify-pack produced no objects");
            return Ok(None);
        }
        return Err(Error::Command {
            command: format!("git {}", args.join(" ")),
            code: out.code(),
            stderr: out.stderr,
        });
    }
    Ok(Some(rank(records, n)))
}

/// Look up `oid` in `rev-list --objects` output. Commits and unnamed objects
/// have no path.
pub fn lookup_path(rev_list: &str, oid: &str) -> Option<String> {
    rev_list.lines().find_map(|line| {
        let (hash, rest) = match line.split_once(' ') {
            Some((hash, rest)) => (hash, rest),
            None => (line.trim_end(), ""),
        };
        if !hash.eq_ignore_ascii_case(oid) {
            return None;
        }
        let path = rest.trim_end_matches(['\r', '\n']);
        Some((!path.is_empty()).then(|| path.to_string()))
    })?
}

/// Attach a path to every ranked object. An object git never named is kept
/// with no path rather than dropped.
pub fn resolve_names(
    git: &Git,
    ranked: Option<Vec<RankedObject>>,
) -> Result<Option<Vec<ResolvedObject>>> {
    let Some(ranked) = ranked else {
        return Ok(None);
    };
    if ranked.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let rev_list = git.run(&["rev-list", "--objects", "--all"])?.stdout;
    let resolved = ranked
        .into_iter()
        .map(|object| {
            let path = lookup_path(&rev_list, &object.oid);
            if path.is_none() {
                tracing::debug!(oid = %object.oid, "no path found for object");
            }
            ResolvedObject { object, path }
        })
        .collect();
    Ok(Some(resolved))
}
