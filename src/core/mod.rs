//! core
//!
//! Domain types, schemas, and pure helpers for gitdeck.
//!
//! # Modules
//!
//! - [`operation`] - The closed set of operations and their typed arguments
//! - [`envelope`] - Uniform `{success, data, error}` result and payload schema
//! - [`types`] - Status, log, branch and remote listings
//! - [`classify`] - Engine failure text classification
//! - [`remote_url`] - HTTPS / secure-shell remote URL conversion
//! - [`version_tag`] - Next release tag suggestion
//! - [`prefs`] - Key-value preference file
//! - [`recent`] - Recently opened repositories
//! - [`gitignore`] - `.gitignore` entry helper
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Operations are a closed enum; unknown names never reach the engine
//! - Result payloads have an explicit schema rather than opaque engine objects
//! - Nothing here spawns processes

pub mod classify;
pub mod config;
pub mod envelope;
pub mod gitignore;
pub mod operation;
pub mod prefs;
pub mod recent;
pub mod remote_url;
pub mod types;
pub mod version_tag;
