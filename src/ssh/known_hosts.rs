//! ssh::known_hosts
//!
//! Trusted-host ledger: matching, discovery and locked appends.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fs2::FileExt;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Key-type preferences tried in order by live discovery.
pub const SCAN_PREFERENCES: [&str; 4] = ["rsa,dsa,ecdsa,ed25519", "rsa", "ecdsa", "ed25519"];

/// Placeholder key text that must never be written.
pub const PLACEHOLDER_KEY: &str = "AAAAEXAMPLE";

/// Published host keys for well-known forges, used only when live discovery
/// fails and the fallback is enabled.
pub const BUILTIN_HOST_KEYS: &[(&str, &[&str])] = &[
    (
        "github.com",
        &[
            "github.com ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsYqDo3bkhkCMTPHK9J6MvC",
            "github.com ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBEmKSENjQEezOmxkZMy7opKgwFB9nkt5YRrYMjNuG5N87uRgg6CLrLk0WKQ7uLwqcN9IR3v/GJWeLwhBYGGSWoA=",
        ],
    ),
    (
        "gitlab.com",
        &[
            "gitlab.com ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIAfuCHKVTjquxvt98WTOuOuP4uZ8xeBFVvyZ0B+9Pj44",
            "gitlab.com ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBFSMqzJeV9rUzU/odLm0t2HKQsbiI17W1t7053sP07YlNNROlJfoM6MxMHhFYDkjHSaw8bSWcxIrmhqmG5HzUWE=",
        ],
    ),
];

/// Built-in lines for `host`, if it is a known forge.
pub fn builtin_keys(host: &str) -> Option<&'static [&'static str]> {
    BUILTIN_HOST_KEYS
        .iter()
        .find(|(name, _)| *name == host)
        .map(|(_, keys)| *keys)
}

/// Whether `host` is a plain host name or address that is safe to hand to
/// a scanner: ASCII letters, digits, `.` and `-`, not starting with `-`.
pub fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && !host.starts_with('-')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Whether one `known_hosts` line names `host`.
///
/// The host field may list several comma-separated patterns, and may be
/// preceded by a `@cert-authority`/`@revoked` marker. Hashed entries never
/// match.
pub fn line_matches(line: &str, host: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return false;
    }

    let mut fields = line.split_whitespace();
    let mut hosts = fields.next().unwrap_or("");
    if hosts.starts_with('@') {
        hosts = fields.next().unwrap_or("");
    }

    let bracketed = format!("[{}]:", host);
    hosts
        .split(',')
        .any(|pattern| pattern == host || pattern.starts_with(&bracketed))
}

/// Whether any line of `content` names `host`.
pub fn contains_host(content: &str, host: &str) -> bool {
    content.lines().any(|line| line_matches(line, host))
}

/// Lines of scanner output worth recording.
pub fn usable_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| !line.contains(PLACEHOLDER_KEY))
        .map(str::to_string)
        .collect()
}

/// Result of [`append_locked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    /// Lines were written
    Appended(usize),
    /// Another writer recorded the host first
    AlreadyPresent,
}

/// Append `lines` for `host` under an exclusive lock.
///
/// Membership is re-checked while holding the lock, so concurrent callers
/// never record the same host twice. All I/O goes through the locked handle;
/// on Windows the lock is mandatory and a second handle could not read.
pub fn append_locked(path: &Path, host: &str, lines: &[String]) -> std::io::Result<AppendResult> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;
    file.lock_exclusive()?;

    let result = (|| -> std::io::Result<AppendResult> {
        let mut existing = String::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_string(&mut existing)?;
        if contains_host(&existing, host) {
            return Ok(AppendResult::AlreadyPresent);
        }

        let mut text = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            text.push('\n');
        }
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        Ok(AppendResult::Appended(lines.len()))
    })();

    let unlocked = FileExt::unlock(&file);
    let result = result?;
    unlocked?;
    Ok(result)
}

/// A failed discovery attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ScanError(pub String);

/// Live host-key discovery.
#[async_trait]
pub trait HostKeyScanner: Send + Sync {
    /// Scan `host` for keys of the comma-separated `key_types`.
    async fn scan(&self, host: &str, key_types: &str) -> Result<String, ScanError>;

    /// Last-resort, platform-specific scan.
    async fn platform_scan(&self, host: &str) -> Result<String, ScanError>;
}

/// Scanner backed by `ssh-keyscan`.
#[derive(Debug, Clone)]
pub struct SystemScanner {
    /// Upper bound on one scan
    pub timeout: Duration,
}

impl Default for SystemScanner {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl SystemScanner {
    async fn run(&self, mut cmd: Command) -> Result<String, ScanError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ScanError(format!("scan timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| ScanError(format!("cannot run ssh-keyscan: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() && !stdout.trim().is_empty() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        Err(ScanError(if message.is_empty() {
            "no host keys returned".to_string()
        } else {
            message.to_string()
        }))
    }
}

#[async_trait]
impl HostKeyScanner for SystemScanner {
    async fn scan(&self, host: &str, key_types: &str) -> Result<String, ScanError> {
        debug!(host, key_types, "running ssh-keyscan");
        let mut cmd = Command::new("ssh-keyscan");
        cmd.args(["-T", "10", "-t", key_types, host]);
        self.run(cmd).await
    }

    async fn platform_scan(&self, host: &str) -> Result<String, ScanError> {
        let mut cmd = Command::new("ssh-keyscan");
        if cfg!(windows) {
            cmd.args(["-t", "rsa", host]);
        } else {
            cmd.args(["-T", "10", host]);
        }
        debug!(host, "running platform host-key scan");
        self.run(cmd).await
    }
}
