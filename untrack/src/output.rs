//! Where each kind of message goes.
//!
//! Status messages carry a colored marker and are silenced by `--quiet`.
//! Warnings and errors always reach stderr. Records are the data a command
//! was asked for (list lines, JSON, tables): they are printed bare on stdout
//! and survive quiet mode so they can be piped.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::{ColoredString, Colorize};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Success,
    Info,
    Detail,
    Record,
    Warn,
    Error,
}

impl Channel {
    fn marker(self) -> Option<ColoredString> {
        match self {
            Channel::Success => Some("✓".green()),
            Channel::Info => Some("→".blue()),
            Channel::Warn => Some("!".yellow()),
            Channel::Error => Some("✗".red()),
            Channel::Detail | Channel::Record => None,
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Channel::Warn | Channel::Error)
    }

    fn silenced_by(self, quiet: bool) -> bool {
        quiet && matches!(self, Channel::Success | Channel::Info | Channel::Detail)
    }
}

fn render(channel: Channel, msg: &str) -> String {
    match channel.marker() {
        Some(marker) => format!("{marker} {msg}"),
        None => msg.to_string(),
    }
}

fn emit(channel: Channel, msg: &str) {
    if channel.silenced_by(is_quiet()) {
        return;
    }
    let line = render(channel, msg);
    if channel.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn success(msg: &str) {
    emit(Channel::Success, msg);
}

pub fn info(msg: &str) {
    emit(Channel::Info, msg);
}

/// Pass-through of git's own output.
pub fn detail(msg: &str) {
    emit(Channel::Detail, msg);
}

/// Requested data; printed even in quiet mode.
pub fn record(msg: &str) {
    emit(Channel::Record, msg);
}

pub fn warn(msg: &str) {
    emit(Channel::Warn, msg);
}

pub fn error(msg: &str) {
    emit(Channel::Error, msg);
}
