//! client::remote
//!
//! Multi-step remote workflows built from single operations.
//!
//! - [`GitClient::switch_remote_protocol`]: read a remote's URL, rewrite it
//!   to HTTPS or SSH, store it, and for SSH make sure the host is trusted
//! - [`GitClient::connect_remote`]: point a remote at a URL, adding the
//!   remote or updating it as needed

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::{GitClient, NoticeLevel, Notifier, Transport};
use crate::core::classify::{classify, FailureKind};
use crate::core::envelope::{Envelope, OpOutput};
use crate::core::remote_url::{self, RemoteProtocol};
use crate::ssh::{HostKeyScanner, SshHelper, TrustOutcome};

/// Errors from [`GitClient::switch_remote_protocol`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("cannot read URL of remote {remote}: {message}")]
    Lookup { remote: String, message: String },

    #[error("remote URL is neither a canonical HTTPS nor SSH address: {0}")]
    Unrecognized(String),

    #[error("cannot update remote {remote}: {message}")]
    Update { remote: String, message: String },
}

/// Outcome of a protocol switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSwitch {
    pub remote: String,
    pub from: String,
    pub to: String,
    /// Whether the stored URL was rewritten
    pub changed: bool,
    /// Host trust, for SSH targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustOutcome>,
    /// Why the host could not be trusted; the URL change still stands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_error: Option<String>,
}

impl<T: Transport, N: Notifier> GitClient<T, N> {
    /// Rewrite `remote` to the `target` protocol.
    ///
    /// A URL already in the target form is left as is. For SSH targets the
    /// host is then recorded in `known_hosts` through `ssh`; a trust failure
    /// is returned in the outcome rather than as an error, since the remote
    /// has already been changed.
    pub async fn switch_remote_protocol<S: HostKeyScanner>(
        &self,
        repo: &Path,
        remote: &str,
        target: RemoteProtocol,
        ssh: &SshHelper<S>,
    ) -> Result<RemoteSwitch, RemoteError> {
        let from = match self.get_remote_url(repo, remote).await.into_result() {
            Ok(Some(OpOutput::Text(url))) => url.trim().to_string(),
            Ok(_) => {
                return Err(RemoteError::Lookup {
                    remote: remote.to_string(),
                    message: "no URL returned".to_string(),
                })
            }
            Err(message) => {
                return Err(RemoteError::Lookup {
                    remote: remote.to_string(),
                    message,
                })
            }
        };

        let to = remote_url::convert(&from, target)
            .ok_or_else(|| RemoteError::Unrecognized(from.clone()))?;
        let changed = to != from;

        if changed {
            let envelope = self.set_remote_url(repo, remote, &to).await;
            if let Err(message) = envelope.into_result() {
                return Err(RemoteError::Update {
                    remote: remote.to_string(),
                    message,
                });
            }
            info!(remote, %from, %to, "remote protocol switched");
            self.notifier.notify(
                NoticeLevel::Success,
                &format!("Remote {} now uses {}", remote, target),
            );
        }

        let mut switch = RemoteSwitch {
            remote: remote.to_string(),
            from,
            to,
            changed,
            trust: None,
            trust_error: None,
        };

        if target == RemoteProtocol::Ssh {
            if let Some(host) = remote_url::ssh_host(&switch.to) {
                match ssh.trust_host(host).await {
                    Ok(outcome) => switch.trust = Some(outcome),
                    Err(e) => {
                        warn!(host, error = %e, "could not trust remote host");
                        self.notifier.notify(NoticeLevel::Error, &e.to_string());
                        switch.trust_error = Some(e.to_string());
                    }
                }
            }
        }

        Ok(switch)
    }

    /// Point remote `name` at `url`, adding it if it does not exist.
    pub async fn connect_remote(&self, repo: &Path, name: &str, url: &str) -> Envelope {
        let url = url.trim();
        if url.is_empty() {
            let envelope = Envelope::err("remote URL is empty");
            self.notifier
                .notify(NoticeLevel::Error, "git add-remote failed: remote URL is empty");
            return envelope;
        }

        let listing = self.transport.call("get-remotes", repo, Vec::new()).await;
        let exists = matches!(&listing.data, Some(OpOutput::Remotes(list)) if list.contains(name));

        let envelope = if exists {
            self.set_remote_url(repo, name, url).await
        } else {
            let args = vec![name.to_string(), url.to_string()];
            let added = self.transport.call("add-remote", repo, args.clone()).await;
            let taken = added
                .error_message()
                .is_some_and(|m| classify(m) == FailureKind::RemoteExists);
            if taken {
                self.set_remote_url(repo, name, url).await
            } else {
                self.report("add-remote", &args, added)
            }
        };

        if envelope.success {
            self.notifier.notify(
                NoticeLevel::Success,
                &format!("Remote {} set to {}", name, url),
            );
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{RecordingNotifier, StubTransport};
    use crate::core::types::{RemoteEntry, RemoteList};
    use crate::ssh::{ScanError, SshPaths};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct NoScan;

    #[async_trait]
    impl HostKeyScanner for NoScan {
        async fn scan(&self, _host: &str, _key_types: &str) -> Result<String, ScanError> {
            Err(ScanError("connection refused".into()))
        }

        async fn platform_scan(&self, _host: &str) -> Result<String, ScanError> {
            Err(ScanError("connection refused".into()))
        }
    }

    fn remotes(names: &[&str]) -> Envelope {
        Envelope::ok(OpOutput::Remotes(RemoteList {
            remotes: names
                .iter()
                .map(|n| RemoteEntry {
                    name: n.to_string(),
                    fetch: "u".into(),
                    push: "u".into(),
                })
                .collect(),
        }))
    }

    #[tokio::test]
    async fn connect_updates_an_existing_remote() {
        let transport = StubTransport::new();
        transport.respond("get-remotes", remotes(&["origin"]));
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());

        let env = client.connect_remote(Path::new("/repo"), "origin", " git@h:a/b.git ").await;
        assert!(env.success);
        let calls = transport.calls();
        assert_eq!(calls[1].0, "remote");
        assert_eq!(calls[1].1, vec!["set-url", "origin", "git@h:a/b.git"]);
    }

    #[tokio::test]
    async fn connect_adds_a_missing_remote() {
        let transport = StubTransport::new();
        transport.respond("get-remotes", remotes(&[]));
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());

        assert!(client.connect_remote(Path::new("/repo"), "origin", "u").await.success);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], ("add-remote".to_string(), vec!["origin".to_string(), "u".to_string()]));
        assert_eq!(
            client.notifier().notices(),
            vec![(NoticeLevel::Success, "Remote origin set to u".to_string())]
        );
    }

    #[tokio::test]
    async fn connect_falls_back_when_name_is_taken() {
        let transport = StubTransport::new();
        transport.respond("get-remotes", Envelope::err("fatal: not a git repository"));
        transport.respond("add-remote", Envelope::err("error: remote origin already exists."));
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());

        assert!(client.connect_remote(Path::new("/repo"), "origin", "u").await.success);
        assert_eq!(transport.calls().last().unwrap().0, "remote");
        assert!(client
            .notifier()
            .notices()
            .iter()
            .all(|(level, _)| *level == NoticeLevel::Success));
    }

    #[tokio::test]
    async fn connect_rejects_empty_url() {
        let transport = StubTransport::new();
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());
        assert!(!client.connect_remote(Path::new("/repo"), "origin", "  ").await.success);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_url_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let ssh = SshHelper::with_scanner(SshPaths::new(dir.path().join(".ssh")), NoScan);
        let transport = StubTransport::new();
        transport.respond("remote", Envelope::ok(OpOutput::Text("/srv/git/app\n".into())));
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());

        let err = client
            .switch_remote_protocol(Path::new("/repo"), "origin", RemoteProtocol::Ssh, &ssh)
            .await
            .unwrap_err();
        assert_eq!(err, RemoteError::Unrecognized("/srv/git/app".into()));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn https_target_skips_host_trust() {
        let dir = TempDir::new().unwrap();
        let ssh = SshHelper::with_scanner(SshPaths::new(dir.path().join(".ssh")), NoScan);
        let transport = StubTransport::new();
        transport.respond(
            "remote",
            Envelope::ok(OpOutput::Text("git@git.example.org:team/app.git\n".into())),
        );
        let client = GitClient::new(transport.clone(), RecordingNotifier::new());

        let switch = client
            .switch_remote_protocol(Path::new("/repo"), "origin", RemoteProtocol::Https, &ssh)
            .await
            .unwrap();
        assert!(switch.changed);
        assert_eq!(switch.to, "https://git.example.org/team/app.git");
        assert_eq!(switch.trust, None);
        assert!(!ssh.paths().known_hosts().exists());
    }
}
