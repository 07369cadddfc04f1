pub mod analysis;
mod backup;
pub mod error;
pub mod finalize;
pub mod format;
pub mod gitutil;
pub mod opts;
pub mod output;
pub mod rewrite;
pub mod sanity;

use comfy_table::presets::UTF8_FULL;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

pub use error::{Error, Result};
pub use gitutil::Git;
pub use opts::{Command, ListFormat, ListOptions, Options, RmOptions};

use analysis::ResolvedObject;

/// Check the repository, then run the requested command against it.
pub fn run(opts: &Options) -> Result<()> {
    let git = Git::new(&opts.repo);
    sanity::ensure_top_level(&git)?;
    match &opts.command {
        Command::List(list) => run_list(&git, list),
        Command::Rm(rm) => run_rm(&git, rm),
        Command::Reset => run_reset(&git),
        Command::Confirm => run_confirm(&git),
    }
}

fn run_list(git: &Git, list: &ListOptions) -> Result<()> {
    let ranked = analysis::find_largest(git, list.top)?;
    let resolved = analysis::resolve_names(git, ranked)?;
    match list.format {
        ListFormat::Json => print_json(resolved.as_deref().unwrap_or_default()),
        ListFormat::Table => {
            if let Some(objects) = &resolved {
                print_table(objects);
            }
            Ok(())
        }
        ListFormat::Lines => {
            for object in resolved.iter().flatten() {
                output::record(&object.display_record());
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    object: &'a ResolvedObject,
    /// Same number as in `display`, ungrouped.
    size_kib: u64,
    display: String,
}

fn print_json(objects: &[ResolvedObject]) -> Result<()> {
    let entries: Vec<JsonEntry<'_>> = objects
        .iter()
        .map(|object| JsonEntry {
            object,
            size_kib: format::kib_count(object.object.size),
            display: object.display_record(),
        })
        .collect();
    output::record(&serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn print_table(objects: &[ResolvedObject]) {
    if objects.is_empty() {
        return;
    }
    let headers = [
        ("#", CellAlignment::Right),
        ("Object", CellAlignment::Left),
        ("Type", CellAlignment::Left),
        ("Size", CellAlignment::Right),
        ("Path", CellAlignment::Left),
    ];
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|(title, align)| {
        Cell::new(*title)
            .add_attribute(Attribute::Bold)
            .set_alignment(*align)
    }));
    for (idx, object) in objects.iter().enumerate() {
        let row = [
            (idx + 1).to_string(),
            object.object.oid.clone(),
            object.object.kind.to_string(),
            format!("{} KB", format::kib(object.object.size)),
            object.path.clone().unwrap_or_default(),
        ];
        table.add_row(
            headers
                .iter()
                .zip(row)
                .map(|((_, align), value)| Cell::new(value).set_alignment(*align)),
        );
    }
    output::record(&table.to_string());
}

fn run_rm(git: &Git, rm: &RmOptions) -> Result<()> {
    if rm.backup {
        let bundle = backup::create_backup(git, rm.backup_path.as_deref())?;
        output::success(&format!("Backup bundle saved to {}", bundle.display()));
    }

    let out = rewrite::remove_from_history(git, &rm.paths, rm.force)?;
    for line in out.stdout.lines().filter(|l| !l.trim().is_empty()) {
        output::detail(line);
    }

    if rm.force {
        output::success("Removed from history and confirmed; this cannot be undone.");
    } else {
        output::info(
            "History rewritten. Run `untrack confirm` to make it permanent, \
             or `untrack reset` to undo it.",
        );
    }
    Ok(())
}

fn run_reset(git: &Git) -> Result<()> {
    match finalize::reset(git) {
        Ok(()) => {
            output::success("History restored from the backup refs.");
            Ok(())
        }
        Err(err) if err.is_warning() => {
            output::warn(&err.to_string());
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn run_confirm(git: &Git) -> Result<()> {
    finalize::confirm(git)?;
    output::success("Backup refs deleted, reflogs expired and garbage collected; the removal is permanent.");
    Ok(())
}
