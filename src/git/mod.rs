//! git
//!
//! Single doorway to the version-control engine.
//!
//! # Architecture
//!
//! gitdeck never implements version control itself. Every repository read
//! and write is a `git` process started through an [`Engine`] binding. No
//! other module spawns `git`.
//!
//! - [`interface`]: the [`Engine`] trait and its [`GitCli`] implementation
//! - [`registry`]: one cached binding per repository path
//! - [`parse`]: porcelain output to typed listings
//!
//! # Invariants
//!
//! - Commands never prompt (`GIT_TERMINAL_PROMPT=0`, stdin closed)
//! - Diagnostics are in the C locale so failure text can be classified
//! - Every command is bounded by the block timeout
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::git::{EngineRegistry, EngineSettings};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), gitdeck::git::EngineError> {
//! let registry = EngineRegistry::new(EngineSettings::default());
//! let engine = registry.get_or_create(Path::new("/work/app"));
//! let head = engine.run(&["rev-parse".into(), "HEAD".into()]).await?;
//! # Ok(())
//! # }
//! ```

pub mod interface;
pub mod parse;
pub mod registry;

pub use interface::{Engine, EngineError, EngineSettings, GitCli};
pub use registry::{EngineFactory, EngineRegistry};
