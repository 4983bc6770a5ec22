//! git::interface
//!
//! The engine binding: one handle per repository path that runs `git`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Errors from running the engine.
///
/// Engine failures carry no taxonomy beyond the engine's own diagnostic:
/// conflicts, authentication and network failures all arrive as
/// [`EngineError::Failed`], whose display is that diagnostic verbatim.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable is not installed or not on `PATH`.
    #[error("{binary} executable not found")]
    BinaryNotFound {
        /// The executable that was looked up
        binary: String,
    },

    /// The process could not be started.
    #[error("failed to run {binary}: {message}")]
    Spawn {
        /// The executable
        binary: String,
        /// OS error description
        message: String,
    },

    /// The command did not finish within the block timeout.
    #[error("{binary} did not finish within {secs}s")]
    TimedOut {
        /// The executable
        binary: String,
        /// The timeout that elapsed
        secs: u64,
    },

    /// The engine reported failure.
    #[error("{message}")]
    Failed {
        /// Diagnostic text taken from the engine
        message: String,
    },
}

/// Settings shared by every binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Engine executable
    pub binary: String,
    /// Upper bound on one command's run time
    pub block_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            block_timeout: Duration::from_secs(300),
        }
    }
}

impl EngineSettings {
    /// Settings from the loaded configuration.
    pub fn from_config(config: &crate::core::config::Config) -> Self {
        Self {
            binary: config.git_binary().to_string(),
            block_timeout: config.engine_timeout(),
        }
    }
}

/// A binding to the engine for one working directory.
///
/// The only primitive is [`Engine::run`]: raw arguments in, standard output
/// out. Shaping operations into arguments is the dispatcher's job, so test
/// doubles only need to answer argument vectors.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Directory every command runs in.
    fn workdir(&self) -> &Path;

    /// Run one command and return its standard output.
    async fn run(&self, args: &[String]) -> Result<String, EngineError>;
}

/// Engine binding backed by the `git` executable.
///
/// Commands issued through one binding run one at a time.
pub struct GitCli {
    workdir: PathBuf,
    settings: EngineSettings,
    gate: Mutex<()>,
}

impl std::fmt::Debug for GitCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCli")
            .field("workdir", &self.workdir)
            .field("binary", &self.settings.binary)
            .finish()
    }
}

impl GitCli {
    /// Bind to `workdir`. Nothing is spawned until the first command.
    pub fn new(workdir: impl Into<PathBuf>, settings: EngineSettings) -> Self {
        Self {
            workdir: workdir.into(),
            settings,
            gate: Mutex::new(()),
        }
    }

    /// Settings this binding was created with.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.settings.binary);
        cmd.args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Engine for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[instrument(skip(self), fields(workdir = %self.workdir.display()))]
    async fn run(&self, args: &[String]) -> Result<String, EngineError> {
        let _turn = self.gate.lock().await;
        let binary = &self.settings.binary;

        debug!("spawning engine command");
        let output = tokio::time::timeout(self.settings.block_timeout, self.command(args).output())
            .await
            .map_err(|_| EngineError::TimedOut {
                binary: binary.clone(),
                secs: self.settings.block_timeout.as_secs(),
            })?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::BinaryNotFound {
                    binary: binary.clone(),
                },
                _ => EngineError::Spawn {
                    binary: binary.clone(),
                    message: e.to_string(),
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            debug!(bytes = stdout.len(), "engine command succeeded");
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} exited with {}", binary, output.status));

        debug!(status = %output.status, "engine command failed");
        Err(EngineError::Failed { message })
    }
}
