//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitdeck has a single, user-level configuration scope. Every key is
//! optional; accessors on [`Config`] apply the defaults.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$GITDECK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitdeck/config.toml`
//! 3. `~/.gitdeck/config.toml` (canonical location)
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Engine: {}", config.git_binary());
//! println!("Remote: {}", config.default_remote());
//! println!("Log limit: {}", config.log_limit());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::operation::DEFAULT_REMOTE;

/// Default engine timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = schema::MIN_TIMEOUT_SECS;

/// Default number of commits returned by `log`.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Branch assumed when the current branch cannot be determined.
pub const DEFAULT_FALLBACK_BRANCH: &str = "main";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied by accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed configuration
    pub global: GlobalConfig,
    /// Path to the config file (if one was found)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds invalid values. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find()? {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from one specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        global.validate()?;

        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// The first existing config file in search order.
    fn find() -> Result<Option<PathBuf>, ConfigError> {
        if let Ok(path) = std::env::var("GITDECK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitdeck/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".gitdeck/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Get the canonical config path, `~/.gitdeck/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".gitdeck/config.toml"))
    }

    /// Get the path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Engine executable. Defaults to "git".
    pub fn git_binary(&self) -> &str {
        self.global
            .git
            .as_ref()
            .and_then(|g| g.binary.as_deref())
            .unwrap_or("git")
    }

    /// Timeout for one engine command. Defaults to 300 seconds.
    pub fn engine_timeout(&self) -> Duration {
        let secs = self
            .global
            .git
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Remote used for defaulted arguments and the upstream retry.
    pub fn default_remote(&self) -> &str {
        self.global
            .dispatch
            .as_ref()
            .and_then(|d| d.default_remote.as_deref())
            .unwrap_or(DEFAULT_REMOTE)
    }

    /// Branch assumed when the current branch is unknown. Defaults to "main".
    pub fn fallback_branch(&self) -> &str {
        self.global
            .dispatch
            .as_ref()
            .and_then(|d| d.fallback_branch.as_deref())
            .unwrap_or(DEFAULT_FALLBACK_BRANCH)
    }

    /// Maximum commits returned by `log`. Defaults to 50.
    pub fn log_limit(&self) -> usize {
        self.global
            .dispatch
            .as_ref()
            .and_then(|d| d.log_limit)
            .unwrap_or(DEFAULT_LOG_LIMIT)
    }

    /// Key directory override.
    pub fn ssh_dir(&self) -> Option<&Path> {
        self.global.ssh.as_ref().and_then(|s| s.dir.as_deref())
    }

    /// Whether built-in host keys may be used. Defaults to `true`.
    pub fn builtin_host_keys(&self) -> bool {
        self.global
            .ssh
            .as_ref()
            .and_then(|s| s.builtin_host_keys)
            .unwrap_or(true)
    }

    /// Preference file override for the recent-repository list.
    pub fn recent_path(&self) -> Option<&Path> {
        self.global.recent.as_ref().and_then(|r| r.path.as_deref())
    }
}
