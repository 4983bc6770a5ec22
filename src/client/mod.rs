//! client
//!
//! Client-side operation façade.
//!
//! # Architecture
//!
//! The rest of the application talks to [`GitClient`], never to the
//! dispatcher directly. The façade:
//!
//! - forwards each call across a [`Transport`] (the process boundary)
//! - turns "no commits yet" failures of `status`/`log` into empty successes
//! - raises a [`Notifier`] notice for genuine failures and for successful
//!   mutating operations
//!
//! [`Dispatcher`] implements [`Transport`] directly for in-process use.
//! Workflows spanning several operations (protocol switch, remote connect)
//! live in `remote`.
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::client::{GitClient, mock::RecordingNotifier};
//! use gitdeck::core::config::Config;
//! use gitdeck::engine::Dispatcher;
//! use std::path::Path;
//!
//! # tokio_test::block_on(async {
//! let client = GitClient::new(Dispatcher::from_config(&Config::default()), RecordingNotifier::new());
//! let log = client.get_log(Path::new("/work/app")).await;
//! assert!(log.success);
//! # });
//! ```

pub mod mock;
mod remote;

pub use remote::{RemoteError, RemoteSwitch};

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::classify::classify;
use crate::core::config::DEFAULT_FALLBACK_BRANCH;
use crate::core::envelope::{Envelope, OpOutput};
use crate::core::operation::OperationName;
use crate::core::types::{LogResult, StatusSummary};
use crate::core::version_tag;
use crate::engine::Dispatcher;
use crate::git::parse::parse_tags;

/// The cross-boundary call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run `operation` against `repo` and return its envelope.
    async fn call(&self, operation: &str, repo: &Path, args: Vec<String>) -> Envelope;
}

#[async_trait]
impl Transport for Dispatcher {
    async fn call(&self, operation: &str, repo: &Path, args: Vec<String>) -> Envelope {
        self.dispatch(operation, repo, args).await
    }
}

/// Kind of user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Display-layer sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// One method per operation, over a transport.
#[derive(Debug)]
pub struct GitClient<T, N> {
    transport: T,
    notifier: N,
    fallback_branch: String,
}

impl<T: Transport, N: Notifier> GitClient<T, N> {
    pub fn new(transport: T, notifier: N) -> Self {
        Self {
            transport,
            notifier,
            fallback_branch: DEFAULT_FALLBACK_BRANCH.to_string(),
        }
    }

    /// Use `branch` when the current branch cannot be determined.
    pub fn with_fallback_branch(mut self, branch: impl Into<String>) -> Self {
        self.fallback_branch = branch.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run any operation by wire name.
    ///
    /// Applies benign-empty coercion for `status` and `log`, and raises
    /// notices.
    pub async fn execute(&self, operation: &str, repo: &Path, args: Vec<String>) -> Envelope {
        debug!(operation, repo = %repo.display(), "calling across transport");
        let envelope = self.transport.call(operation, repo, args.clone()).await;
        self.report(operation, &args, envelope)
    }

    /// Coerce and announce an envelope that came back for `operation`.
    fn report(&self, operation: &str, args: &[String], envelope: Envelope) -> Envelope {
        let name = operation.parse::<OperationName>().ok();

        if envelope.success {
            if let Some(message) = name.and_then(|n| success_notice(n, args)) {
                self.notifier.notify(NoticeLevel::Success, &message);
            }
            return envelope;
        }

        let message = envelope.error_message().unwrap_or_default().to_string();
        if classify(&message).is_benign_empty() {
            let empty = match name {
                Some(OperationName::Log) => Some(OpOutput::Log(LogResult::default())),
                Some(OperationName::Status) => Some(OpOutput::Status(StatusSummary::default())),
                _ => None,
            };
            if let Some(empty) = empty {
                info!(operation, "repository has no commits yet, returning empty result");
                return Envelope::ok(empty);
            }
        }

        warn!(operation, error = %message, "operation failed");
        self.notifier.notify(
            NoticeLevel::Error,
            &format!("git {} failed: {}", operation, message),
        );
        envelope
    }

    pub async fn init(&self, repo: &Path) -> Envelope {
        self.execute("init", repo, Vec::new()).await
    }

    pub async fn get_status(&self, repo: &Path) -> Envelope {
        self.execute("status", repo, Vec::new()).await
    }

    /// Whether `repo` answers a status query.
    pub async fn is_git_repository(&self, repo: &Path) -> bool {
        self.transport.call("status", repo, Vec::new()).await.success
    }

    /// Stage `pathspec`, or everything when `None`.
    pub async fn add(&self, repo: &Path, pathspec: Option<&str>) -> Envelope {
        self.execute("add", repo, vec![pathspec.unwrap_or(".").to_string()])
            .await
    }

    pub async fn commit(&self, repo: &Path, message: &str) -> Envelope {
        self.execute("commit", repo, vec![message.to_string()]).await
    }

    /// Commit history; an empty repository yields an empty list.
    pub async fn get_log(&self, repo: &Path) -> Envelope {
        self.execute("log", repo, Vec::new()).await
    }

    pub async fn pull(&self, repo: &Path) -> Envelope {
        self.execute("pull", repo, Vec::new()).await
    }

    /// Push with optional raw flags. The dispatcher sets an upstream when
    /// the branch has none.
    pub async fn push(&self, repo: &Path, flags: &[&str]) -> Envelope {
        let flags = flags.iter().map(|f| f.to_string()).collect();
        self.execute("push", repo, flags).await
    }

    pub async fn get_branches(&self, repo: &Path) -> Envelope {
        self.execute("branch", repo, Vec::new()).await
    }

    pub async fn checkout(&self, repo: &Path, branch: &str) -> Envelope {
        self.execute("checkout", repo, vec![branch.to_string()]).await
    }

    pub async fn create_branch(&self, repo: &Path, branch: &str) -> Envelope {
        self.execute("create-branch", repo, vec![branch.to_string()])
            .await
    }

    pub async fn fetch(&self, repo: &Path, remote: Option<&str>) -> Envelope {
        self.execute("fetch", repo, optional_args([remote])).await
    }

    pub async fn get_diff(&self, repo: &Path, file: &str) -> Envelope {
        self.execute("diff-file", repo, vec![file.to_string()]).await
    }

    /// Unstage `file`, or the whole index when `None`.
    pub async fn unstage(&self, repo: &Path, file: Option<&str>) -> Envelope {
        self.execute("reset", repo, optional_args([file])).await
    }

    pub async fn show(&self, repo: &Path, identifier: &str) -> Envelope {
        self.execute("show", repo, vec![identifier.to_string()]).await
    }

    /// The checked-out branch, or the fallback branch if it is unknown.
    pub async fn get_current_branch(&self, repo: &Path) -> String {
        let envelope = self.execute("branch", repo, Vec::new()).await;
        match envelope.into_result() {
            Ok(Some(OpOutput::Branches(summary))) => summary
                .current
                .unwrap_or_else(|| self.fallback_branch.clone()),
            _ => self.fallback_branch.clone(),
        }
    }

    /// Tag names as a list.
    pub async fn get_tags(&self, repo: &Path) -> Envelope {
        let envelope = self.execute("tag-list", repo, Vec::new()).await;
        if let (true, Some(OpOutput::Text(listing))) = (envelope.success, &envelope.data) {
            return Envelope::ok(OpOutput::Tags(parse_tags(listing)));
        }
        envelope
    }

    /// Suggest the next release tag after refreshing from the default remote.
    ///
    /// Neither a failed fetch nor a failed listing is reported; the
    /// suggestion then falls back to what is known locally, or
    /// [`INITIAL_TAG`](crate::core::version_tag::INITIAL_TAG).
    pub async fn suggest_next_tag(&self, repo: &Path) -> String {
        let fetched = self.transport.call("fetch", repo, Vec::new()).await;
        if !fetched.success {
            debug!(error = ?fetched.error, "fetch before tag suggestion failed");
        }
        let tags = match self.transport.call("tag-list", repo, Vec::new()).await.data {
            Some(OpOutput::Text(listing)) => parse_tags(&listing),
            _ => Vec::new(),
        };
        version_tag::next_tag(&tags)
    }

    /// Create a tag; annotated when `message` is given.
    pub async fn create_tag(&self, repo: &Path, name: &str, message: Option<&str>) -> Envelope {
        let mut args = vec![name.to_string()];
        args.extend(message.map(str::to_string));
        self.execute("tag-create", repo, args).await
    }

    /// Push one tag, or all tags when `tag` is `None`.
    pub async fn push_tags(&self, repo: &Path, remote: Option<&str>, tag: Option<&str>) -> Envelope {
        let args = vec![
            remote.unwrap_or_default().to_string(),
            tag.unwrap_or_default().to_string(),
        ];
        self.execute("tag-push", repo, args).await
    }

    pub async fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Envelope {
        self.execute("add-remote", repo, vec![name.to_string(), url.to_string()])
            .await
    }

    pub async fn get_remote_url(&self, repo: &Path, name: &str) -> Envelope {
        self.execute("remote", repo, vec!["get-url".to_string(), name.to_string()])
            .await
    }

    pub async fn set_remote_url(&self, repo: &Path, name: &str, url: &str) -> Envelope {
        let args = vec!["set-url".to_string(), name.to_string(), url.to_string()];
        self.execute("remote", repo, args).await
    }

    pub async fn get_remotes(&self, repo: &Path) -> Envelope {
        self.execute("get-remotes", repo, Vec::new()).await
    }

    /// Clone `url` into `target`, resolved against `repo` when relative.
    pub async fn clone_repository(&self, repo: &Path, url: &str, target: &Path) -> Envelope {
        let args = vec![url.to_string(), target.to_string_lossy().into_owned()];
        self.execute("clone", repo, args).await
    }
}

fn optional_args<const N: usize>(values: [Option<&str>; N]) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect()
}

/// Notice text for a successful mutating operation.
fn success_notice(name: OperationName, args: &[String]) -> Option<String> {
    if !name.announces_success() {
        return None;
    }
    let arg = |i: usize| args.get(i).map(String::as_str).filter(|s| !s.is_empty());

    let message = match name {
        OperationName::Init => "Repository initialized".to_string(),
        OperationName::Add => "Changes staged".to_string(),
        OperationName::Commit => "Committed".to_string(),
        OperationName::Pull => "Pulled from remote".to_string(),
        OperationName::Push => "Pushed to remote".to_string(),
        OperationName::Checkout => format!("Switched to branch {}", arg(0).unwrap_or("?")),
        OperationName::CreateBranch => format!("Created branch {}", arg(0).unwrap_or("?")),
        OperationName::Fetch => format!("Fetched from {}", arg(0).unwrap_or("origin")),
        OperationName::TagCreate => format!("Created tag {}", arg(0).unwrap_or("?")),
        OperationName::TagPush => match arg(1) {
            Some(tag) => format!("Pushed tag {}", tag),
            None => "Pushed all tags".to_string(),
        },
        _ => format!("{} succeeded", name),
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::mock::{RecordingNotifier, StubTransport};
    use super::*;

    fn client(transport: StubTransport) -> GitClient<StubTransport, RecordingNotifier> {
        GitClient::new(transport, RecordingNotifier::new())
    }

    #[tokio::test]
    async fn log_without_commits_is_empty_success() {
        let transport = StubTransport::new();
        transport.respond(
            "log",
            Envelope::err("fatal: your current branch 'main' does not have any commits yet"),
        );
        let client = client(transport);

        let env = client.get_log(Path::new("/repo")).await;
        assert!(env.success);
        assert_eq!(env.data, Some(OpOutput::Log(LogResult::default())));
        assert!(client.notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn other_operations_are_not_coerced() {
        let transport = StubTransport::new();
        transport.respond("show", Envelope::err("does not have any commits yet"));
        let client = client(transport);

        let env = client.show(Path::new("/repo"), "HEAD").await;
        assert!(!env.success);
        let notices = client.notifier().notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NoticeLevel::Error);
        assert!(notices[0].1.starts_with("git show failed:"));
    }

    #[tokio::test]
    async fn mutating_success_is_announced() {
        let client = client(StubTransport::new());
        client.checkout(Path::new("/repo"), "dev").await;
        client.get_status(Path::new("/repo")).await;
        client.push_tags(Path::new("/repo"), None, None).await;

        let notices = client.notifier().notices();
        assert_eq!(
            notices,
            vec![
                (NoticeLevel::Success, "Switched to branch dev".to_string()),
                (NoticeLevel::Success, "Pushed all tags".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn current_branch_falls_back() {
        let transport = StubTransport::new();
        transport.respond("branch", Envelope::err("fatal: not a git repository"));
        let client = client(transport).with_fallback_branch("trunk");
        assert_eq!(client.get_current_branch(Path::new("/repo")).await, "trunk");
    }

    #[tokio::test]
    async fn tags_are_split_into_a_list() {
        let transport = StubTransport::new();
        transport.respond("tag-list", Envelope::ok(OpOutput::Text("v1\n\nv2\n".into())));
        let client = client(transport);
        let env = client.get_tags(Path::new("/repo")).await;
        assert_eq!(env.data, Some(OpOutput::Tags(vec!["v1".into(), "v2".into()])));
    }

    #[tokio::test]
    async fn repository_check_is_silent() {
        let transport = StubTransport::new();
        let client = client(transport.clone());
        assert!(client.is_git_repository(Path::new("/repo")).await);

        transport.respond("status", Envelope::err("fatal: not a git repository"));
        assert!(!client.is_git_repository(Path::new("/tmp")).await);
        assert!(client.notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn next_tag_bumps_highest_version() {
        let transport = StubTransport::new();
        transport.respond("fetch", Envelope::err("fatal: 'origin' does not appear to be a git repository"));
        transport.respond(
            "tag-list",
            Envelope::ok(OpOutput::Text("v1.2.9\nv1.10.0\nnightly\n".into())),
        );
        let client = client(transport.clone());

        assert_eq!(client.suggest_next_tag(Path::new("/repo")).await, "v1.10.1");
        assert_eq!(transport.calls()[0].0, "fetch");
        assert!(client.notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn next_tag_defaults_without_listing() {
        let transport = StubTransport::new();
        transport.respond("tag-list", Envelope::err("fatal: not a git repository"));
        let client = client(transport);
        assert_eq!(client.suggest_next_tag(Path::new("/repo")).await, "v1.0.0");
    }

    #[tokio::test]
    async fn arguments_are_forwarded() {
        let client = client(StubTransport::new());
        let repo = Path::new("/repo");
        client.unstage(repo, None).await;
        client.unstage(repo, Some("a.rs")).await;
        client.create_tag(repo, "v1", Some("notes")).await;
        client.set_remote_url(repo, "origin", "u").await;

        let calls = client.transport().calls();
        assert_eq!(calls[0], ("reset".to_string(), Vec::<String>::new()));
        assert_eq!(calls[1], ("reset".to_string(), vec!["a.rs".to_string()]));
        assert_eq!(calls[2].1, vec!["v1", "notes"]);
        assert_eq!(calls[3].1, vec!["set-url", "origin", "u"]);
    }
}
