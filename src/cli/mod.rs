//! cli
//!
//! Command-line interface layer for gitdeck.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install diagnostic logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands each
//! command to a handler in [`commands`]. Repository operations go through
//! the [`GitClient`](crate::client::GitClient) façade over an in-process
//! [`Dispatcher`](crate::engine::Dispatcher), exactly as a graphical shell
//! would drive them.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use crate::ui::{logging, output::Verbosity};
use anyhow::{Context as _, Result};

/// A failure the handler has already shown to the user.
///
/// `main` exits non-zero without printing it again.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    logging::init(Verbosity::from_flags(cli.quiet, cli.debug));

    let config = Config::load().context("Failed to load configuration")?;

    let ctx = engine::Context {
        config,
        repo: cli.repo.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
