//! ssh::keys
//!
//! The single RSA key pair used for remote authentication.

use std::fs;
use std::path::Path;
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::{SshError, SshPaths};

/// Identity comment used when the caller supplies none.
pub const DEFAULT_IDENTITY: &str = "git@example.com";

/// Whether the key pair exists, and its public half if so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Report on the key pair. Both halves must be present.
pub fn check_key(paths: &SshPaths) -> Result<KeyStatus, SshError> {
    let private = paths.private_key();
    let public = paths.public_key();
    if !private.is_file() || !public.is_file() {
        return Ok(KeyStatus {
            exists: false,
            public_key: None,
        });
    }

    Ok(KeyStatus {
        exists: true,
        public_key: Some(read_trimmed(&public)?),
    })
}

/// The trimmed public key text.
pub fn public_key(paths: &SshPaths) -> Result<String, SshError> {
    let path = paths.public_key();
    if !path.is_file() {
        return Err(SshError::PublicKeyMissing(path));
    }
    read_trimmed(&path)
}

/// Generate a passphrase-less 4096-bit RSA key pair and return its public key.
///
/// An existing private key is never overwritten.
#[instrument(skip(paths), fields(dir = %paths.dir().display()))]
pub async fn generate_key(paths: &SshPaths, identity: &str) -> Result<String, SshError> {
    let private = paths.private_key();
    if private.exists() {
        return Err(SshError::KeyExists(private));
    }

    paths.ensure_dir()?;

    let identity = match identity.trim() {
        "" => DEFAULT_IDENTITY,
        trimmed => trimmed,
    };

    debug!(identity, "running ssh-keygen");
    let output = Command::new("ssh-keygen")
        .args(["-q", "-t", "rsa", "-b", "4096", "-C", identity, "-N", "", "-f"])
        .arg(&private)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SshError::KeyGeneration(format!("cannot run ssh-keygen: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("ssh-keygen exited with {}", output.status),
            trimmed => trimmed.to_string(),
        };
        return Err(SshError::KeyGeneration(message));
    }

    info!(path = %private.display(), "generated ssh key pair");
    public_key(paths)
}

fn read_trimmed(path: &Path) -> Result<String, SshError> {
    fs::read_to_string(path)
        .map(|text| text.trim().to_string())
        .map_err(|source| SshError::Io {
            path: path.to_path_buf(),
            source,
        })
}
