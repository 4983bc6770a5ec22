//! ui
//!
//! Terminal output and diagnostic logging.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, verbosity and the console notifier
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Design
//!
//! All user-facing output goes through this module so quiet mode is honored
//! in one place.

pub mod logging;
pub mod output;
