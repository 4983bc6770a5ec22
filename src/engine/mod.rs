//! engine
//!
//! Routes named operations to engine bindings.
//!
//! # Architecture
//!
//! The [`Dispatcher`] is the single entry point for all version-control
//! actions. It is stateless per call apart from the binding registry it
//! owns:
//!
//! 1. **Validate**: the repository path exists and the operation is known
//! 2. **Resolve**: fetch or create the binding for the path
//! 3. **Run**: shape arguments, run the engine, parse the output
//! 4. **Recover**: retry a push that lacked an upstream, once
//! 5. **Wrap**: return a uniform [`Envelope`](crate::core::envelope::Envelope)
//!
//! # Concurrency
//!
//! Commands against one path are serialized by its binding. Different paths
//! run concurrently. In-flight commands are not cancellable; they finish or
//! hit the block timeout.
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::core::config::Config;
//! use gitdeck::engine::Dispatcher;
//! use std::path::Path;
//!
//! # async fn demo() {
//! let dispatcher = Dispatcher::from_config(&Config::default());
//! let envelope = dispatcher.dispatch("status", Path::new("/work/app"), vec![]).await;
//! if envelope.success {
//!     println!("{:?}", envelope.data);
//! }
//! dispatcher.shutdown();
//! # }
//! ```

pub mod dispatch;

pub use dispatch::{DispatchError, DispatchSettings, Dispatcher};

use std::path::PathBuf;

use crate::core::config::Config;

/// Execution context for commands.
///
/// Contains the loaded configuration and global settings derived from CLI
/// flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Repository path override (defaults to the current directory).
    pub repo: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// The repository path commands act on.
    pub fn repo_path(&self) -> std::io::Result<PathBuf> {
        match &self.repo {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir(),
        }
    }
}
