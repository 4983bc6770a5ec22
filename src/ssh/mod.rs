//! ssh
//!
//! Key-pair management and the trusted-hosts ledger.
//!
//! # Architecture
//!
//! [`SshHelper`] owns the key directory layout ([`SshPaths`]) and a
//! [`HostKeyScanner`]. Trusting a host walks a fixed ladder and stops at the
//! first rung that yields a usable key:
//!
//! 1. **Existing**: the host already has an entry
//! 2. **Live scan**: each preference in [`SCAN_PREFERENCES`] in order
//! 3. **Built-in**: the published keys for github.com and gitlab.com
//! 4. **Platform scan**: a last attempt for hosts without built-in keys
//!
//! Failures are reported, never retried.
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::ssh::{SshHelper, SshPaths};
//!
//! # async fn demo() -> Result<(), gitdeck::ssh::SshError> {
//! let helper = SshHelper::new(SshPaths::from_home()?);
//! if !helper.has_trusted_host("github.com")? {
//!     let outcome = helper.trust_host("github.com").await?;
//!     println!("{}", outcome.message());
//! }
//! # Ok(())
//! # }
//! ```

pub mod keys;
pub mod known_hosts;

pub use keys::{check_key, generate_key, public_key, KeyStatus, DEFAULT_IDENTITY};
pub use known_hosts::{HostKeyScanner, ScanError, SystemScanner, SCAN_PREFERENCES};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::classify::{classify, FailureKind};
use crate::core::config::Config;
use known_hosts::AppendResult;

/// Errors from key and host-trust management.
#[derive(Debug, Error)]
pub enum SshError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("invalid host name: {0:?}")]
    InvalidHost(String),

    #[error("public key not found at {}", .0.display())]
    PublicKeyMissing(PathBuf),

    #[error("an SSH key already exists at {}", .0.display())]
    KeyExists(PathBuf),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error(
        "could not retrieve a host key for {host}: the server's key exchange method is not supported. \
         Add the host key to known_hosts manually"
    )]
    KeyExchangeUnsupported { host: String },

    #[error("could not retrieve a host key for {host}: {message}")]
    HostKeyUnavailable { host: String, message: String },

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Key directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPaths {
    dir: PathBuf,
}

impl SshPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.ssh`
    pub fn from_home() -> Result<Self, SshError> {
        dirs::home_dir()
            .map(|home| Self::new(home.join(".ssh")))
            .ok_or(SshError::NoHomeDir)
    }

    /// The configured directory, or `~/.ssh`.
    pub fn from_config(config: &Config) -> Result<Self, SshError> {
        match config.ssh_dir() {
            Some(dir) => Ok(Self::new(dir)),
            None => Self::from_home(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn private_key(&self) -> PathBuf {
        self.dir.join("id_rsa")
    }

    pub fn public_key(&self) -> PathBuf {
        self.dir.join("id_rsa.pub")
    }

    pub fn known_hosts(&self) -> PathBuf {
        self.dir.join("known_hosts")
    }

    /// Create the directory, owner-only on Unix.
    pub fn ensure_dir(&self) -> Result<(), SshError> {
        let io_err = |source| SshError::Io {
            path: self.dir.clone(),
            source,
        };
        if self.dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700)).map_err(io_err)?;
        }
        Ok(())
    }
}

/// Where a trusted host's key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeySource {
    /// Already recorded before this call
    Existing,
    /// Returned by a live or platform scan
    Scanned,
    /// Taken from the built-in table
    BuiltIn,
}

/// Result of [`SshHelper::trust_host`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustOutcome {
    pub host: String,
    pub source: HostKeySource,
    /// Lines appended to `known_hosts`
    pub added: usize,
}

impl TrustOutcome {
    pub fn message(&self) -> String {
        match self.source {
            HostKeySource::Existing => format!("{} is already a trusted host", self.host),
            HostKeySource::Scanned => format!("Added {} to known hosts", self.host),
            HostKeySource::BuiltIn => format!(
                "Added {} to known hosts using built-in keys (live scan failed)",
                self.host
            ),
        }
    }
}

/// Key-pair and host-trust operations.
#[derive(Debug, Clone)]
pub struct SshHelper<S = SystemScanner> {
    paths: SshPaths,
    scanner: S,
    builtin_host_keys: bool,
}

impl SshHelper<SystemScanner> {
    pub fn new(paths: SshPaths) -> Self {
        Self::with_scanner(paths, SystemScanner::default())
    }

    /// Helper with the configured key directory and fallback policy.
    pub fn from_config(config: &Config) -> Result<Self, SshError> {
        Ok(Self::new(SshPaths::from_config(config)?)
            .with_builtin_host_keys(config.builtin_host_keys()))
    }
}

impl<S: HostKeyScanner> SshHelper<S> {
    pub fn with_scanner(paths: SshPaths, scanner: S) -> Self {
        Self {
            paths,
            scanner,
            builtin_host_keys: true,
        }
    }

    /// Enable or disable the built-in key fallback.
    pub fn with_builtin_host_keys(mut self, enabled: bool) -> Self {
        self.builtin_host_keys = enabled;
        self
    }

    pub fn paths(&self) -> &SshPaths {
        &self.paths
    }

    pub fn check_key(&self) -> Result<KeyStatus, SshError> {
        keys::check_key(&self.paths)
    }

    pub fn public_key(&self) -> Result<String, SshError> {
        keys::public_key(&self.paths)
    }

    pub async fn generate_key(&self, identity: &str) -> Result<String, SshError> {
        keys::generate_key(&self.paths, identity).await
    }

    /// Whether `known_hosts` has an entry for `host`.
    pub fn has_trusted_host(&self, host: &str) -> Result<bool, SshError> {
        let path = self.paths.known_hosts();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(known_hosts::contains_host(&content, host)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SshError::Io { path, source }),
        }
    }

    /// Record `host` in `known_hosts` unless it is already there.
    #[instrument(skip(self))]
    pub async fn trust_host(&self, host: &str) -> Result<TrustOutcome, SshError> {
        if !known_hosts::is_valid_host(host) {
            return Err(SshError::InvalidHost(host.to_string()));
        }
        if self.has_trusted_host(host)? {
            debug!("host already trusted");
            return Ok(self.outcome(host, HostKeySource::Existing, 0));
        }

        let mut failures = Vec::new();

        for key_types in SCAN_PREFERENCES {
            match self.scanner.scan(host, key_types).await {
                Ok(output) => {
                    let lines = known_hosts::usable_lines(&output);
                    if !lines.is_empty() {
                        return self.record(host, HostKeySource::Scanned, &lines);
                    }
                    failures.push(format!("no usable {} keys", key_types));
                }
                Err(e) => {
                    debug!(key_types, error = %e, "host key scan failed");
                    failures.push(e.0);
                }
            }
        }

        if self.builtin_host_keys {
            if let Some(builtin) = known_hosts::builtin_keys(host) {
                warn!(host, "live host key scan failed, falling back to built-in keys");
                let lines: Vec<String> = builtin.iter().map(|l| l.to_string()).collect();
                return self.record(host, HostKeySource::BuiltIn, &lines);
            }
        }

        match self.scanner.platform_scan(host).await {
            Ok(output) => {
                let lines = known_hosts::usable_lines(&output);
                if !lines.is_empty() {
                    return self.record(host, HostKeySource::Scanned, &lines);
                }
            }
            Err(e) => failures.push(e.0),
        }

        if failures
            .iter()
            .any(|m| classify(m) == FailureKind::UnsupportedKeyExchange)
        {
            return Err(SshError::KeyExchangeUnsupported {
                host: host.to_string(),
            });
        }

        Err(SshError::HostKeyUnavailable {
            host: host.to_string(),
            message: failures
                .last()
                .cloned()
                .unwrap_or_else(|| "no host keys returned".to_string()),
        })
    }

    fn record(
        &self,
        host: &str,
        source: HostKeySource,
        lines: &[String],
    ) -> Result<TrustOutcome, SshError> {
        self.paths.ensure_dir()?;
        let path = self.paths.known_hosts();
        let result = known_hosts::append_locked(&path, host, lines)
            .map_err(|source| SshError::Io { path, source })?;

        Ok(match result {
            AppendResult::Appended(added) => {
                info!(host, added, ?source, "trusted host");
                self.outcome(host, source, added)
            }
            AppendResult::AlreadyPresent => self.outcome(host, HostKeySource::Existing, 0),
        })
    }

    fn outcome(&self, host: &str, source: HostKeySource, added: usize) -> TrustOutcome {
        TrustOutcome {
            host: host.to_string(),
            source,
            added,
        }
    }
}
