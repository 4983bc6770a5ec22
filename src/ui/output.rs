//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output respects the quiet flag. Results go to stdout, diagnostics to
//! stderr. Structured results are printed as pretty JSON so the binary can
//! be driven by scripts.

use std::fmt::Display;

use serde::Serialize;

use crate::client::{NoticeLevel, Notifier};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Render a value as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Print a value as pretty JSON. Always shown; this is the command's result.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notifier that prints façade notices to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    verbosity: Verbosity,
}

impl ConsoleNotifier {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => success(message, self.verbosity),
            NoticeLevel::Error => error(message),
        }
    }
}
