//! gitdeck - operation dispatch core for a point-and-click git client
//!
//! gitdeck is the non-visual half of a desktop git client. It turns named
//! operations with positional arguments into runs of the external `git`
//! binary, parses the output into typed results and returns them in a
//! uniform envelope. It also manages the SSH key pair and trusted hosts a
//! client needs for remote access.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the façade)
//! - [`client`] - Caller-side façade with named methods and notices
//! - [`engine`] - Dispatcher: validate, resolve binding, run, recover, wrap
//! - [`git`] - Engine adapter over the `git` binary and output parsers
//! - [`core`] - Operations, result types, envelope, config, preferences
//! - [`ssh`] - Key pair and known-hosts management
//! - [`ui`] - Terminal output and logging
//!
//! # Invariants
//!
//! 1. Every boundary call returns an envelope; failures never escape as panics
//! 2. Commands against one repository path run one at a time
//! 3. A push that lacked an upstream is retried exactly once
//! 4. Existing trusted-host entries are never rewritten

pub mod cli;
pub mod client;
pub mod core;
pub mod engine;
pub mod git;
pub mod ssh;
pub mod ui;
