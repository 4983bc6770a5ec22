//! engine::dispatch
//!
//! The operation dispatcher: the single entry point for every
//! version-control action.
//!
//! # Flow
//!
//! ```text
//! (name, repo, args) -> validate path -> parse Operation -> resolve binding
//!                    -> shape arguments -> run -> parse -> Envelope
//! ```
//!
//! Validation failures (missing path, unknown operation, missing argument)
//! never resolve a binding. Engine failures come back as the engine's own
//! message. The one recovery the dispatcher performs is re-issuing a push
//! that failed for lack of an upstream with `--set-upstream`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::classify::{classify, FailureKind};
use crate::core::config::{Config, DEFAULT_FALLBACK_BRANCH, DEFAULT_LOG_LIMIT};
use crate::core::envelope::{Envelope, OpOutput};
use crate::core::types::RemoteList;
use crate::core::operation::{Operation, RemoteCommand, RequestError, DEFAULT_REMOTE};
use crate::git::parse;
use crate::git::{Engine, EngineError, EngineRegistry, EngineSettings};

/// Errors from dispatching one operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The repository path does not exist.
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The request named an unknown operation or lacked an argument.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The engine failed; displays the engine's diagnostic.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A clone target exists and has content.
    #[error("target directory is not empty: {}", .0.display())]
    TargetNotEmpty(PathBuf),

    /// Preparing a path on disk failed.
    #[error("cannot prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Defaults the dispatcher fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Remote named by the upstream retry
    pub default_remote: String,
    /// Branch assumed when the current branch cannot be determined
    pub fallback_branch: String,
    /// Maximum commits returned by `log`
    pub log_limit: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            default_remote: DEFAULT_REMOTE.to_string(),
            fallback_branch: DEFAULT_FALLBACK_BRANCH.to_string(),
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_remote: config.default_remote().to_string(),
            fallback_branch: config.fallback_branch().to_string(),
            log_limit: config.log_limit(),
        }
    }
}

/// Routes operations to per-path engine bindings.
///
/// Owns the binding registry. Call [`Dispatcher::shutdown`] when the host
/// application stops.
#[derive(Debug)]
pub struct Dispatcher {
    registry: EngineRegistry,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(registry: EngineRegistry, settings: DispatchSettings) -> Self {
        Self { registry, settings }
    }

    /// A dispatcher with `git` bindings configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EngineRegistry::new(EngineSettings::from_config(config)),
            DispatchSettings::from_config(config),
        )
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run a named operation and wrap the outcome in an [`Envelope`].
    ///
    /// Never fails: every error becomes `{success: false, error}`.
    pub async fn dispatch(&self, operation: &str, repo: &Path, args: Vec<String>) -> Envelope {
        info!(operation, repo = %repo.display(), "dispatching");
        match self.execute_request(operation, repo, args).await {
            Ok(data) => {
                debug!(operation, "operation succeeded");
                Envelope::ok(data)
            }
            Err(e) => {
                warn!(operation, error = %e, "operation failed");
                Envelope::err(e.to_string())
            }
        }
    }

    /// Parse and run a named operation.
    pub async fn execute_request(
        &self,
        operation: &str,
        repo: &Path,
        args: Vec<String>,
    ) -> Result<OpOutput, DispatchError> {
        let operation = Operation::from_request(operation, args)?;
        self.execute(repo, operation).await
    }

    /// Run a typed operation against the binding for `repo`.
    #[instrument(skip(self), fields(repo = %repo.display()))]
    pub async fn execute(&self, repo: &Path, operation: Operation) -> Result<OpOutput, DispatchError> {
        ensure_exists(repo)?;
        let engine = self.registry.get_or_create(repo);
        self.run(engine.as_ref(), repo, operation).await
    }

    /// Drop every cached binding.
    pub fn shutdown(&self) {
        info!(bindings = self.registry.len(), "shutting down dispatcher");
        self.registry.clear();
    }

    async fn run(
        &self,
        engine: &dyn Engine,
        repo: &Path,
        operation: Operation,
    ) -> Result<OpOutput, DispatchError> {
        let text = |out: String| -> Result<OpOutput, DispatchError> { Ok(OpOutput::Text(out)) };

        match operation {
            Operation::Init => text(engine.run(&argv(&["init"])).await?),
            Operation::Status => {
                let out = engine.run(&argv(parse::STATUS_ARGS)).await?;
                Ok(OpOutput::Status(parse::parse_status(&out)))
            }
            Operation::Add { pathspec } => text(engine.run(&with(&["add"], [pathspec])).await?),
            Operation::Commit { message } => {
                text(engine.run(&with(&["commit", "-m"], [message])).await?)
            }
            Operation::Log => {
                let limit = format!("--max-count={}", self.settings.log_limit);
                let out = engine
                    .run(&with(&["log", parse::LOG_FORMAT], [limit]))
                    .await?;
                Ok(OpOutput::Log(parse::parse_log(&out)))
            }
            Operation::Pull => text(engine.run(&argv(&["pull"])).await?),
            Operation::Push { flags } => self.push(engine, flags).await,
            Operation::Branch => {
                let out = engine.run(&argv(&["branch", parse::BRANCH_FORMAT])).await?;
                Ok(OpOutput::Branches(parse::parse_branches(&out)))
            }
            Operation::Checkout { branch } => {
                text(engine.run(&with(&["checkout"], [branch])).await?)
            }
            Operation::CreateBranch { branch } => {
                text(engine.run(&with(&["checkout", "-b"], [branch])).await?)
            }
            Operation::Fetch { remote } => text(engine.run(&with(&["fetch"], [remote])).await?),
            Operation::Diff { target } => {
                let target = target.unwrap_or_else(|| "--cached".to_string());
                text(engine.run(&with(&["diff"], [target])).await?)
            }
            Operation::DiffFile { path } => text(engine.run(&with(&["diff"], [path])).await?),
            Operation::Show { object } => text(engine.run(&with(&["show"], [object])).await?),
            Operation::Reset { path: Some(path) } => {
                text(engine.run(&with(&["reset", "--"], [path])).await?)
            }
            Operation::Reset { path: None } => {
                if head_exists(engine).await {
                    text(engine.run(&argv(&["reset", "HEAD"])).await?)
                } else {
                    debug!("HEAD does not resolve, resetting the index without it");
                    text(engine.run(&argv(&["reset"])).await?)
                }
            }
            Operation::Unstage { path } => {
                let args = if head_exists(engine).await {
                    with(&["reset", "HEAD", "--"], [path])
                } else {
                    with(&["reset", "--"], [path])
                };
                text(engine.run(&args).await?)
            }
            Operation::AddRemote { name, url } => {
                text(engine.run(&with(&["remote", "add"], [name, url])).await?)
            }
            Operation::Remote(command) => {
                let args = match command {
                    RemoteCommand::GetUrl { name } => with(&["remote", "get-url"], [name]),
                    RemoteCommand::SetUrl { name, url } => {
                        with(&["remote", "set-url"], [name, url])
                    }
                    RemoteCommand::Passthrough(rest) => with(&["remote"], rest),
                };
                text(engine.run(&args).await?)
            }
            Operation::Clone { url, target } => {
                let target = repo.join(target);
                prepare_clone_target(&target)?;
                let args = vec![
                    "clone".to_string(),
                    url,
                    target.to_string_lossy().into_owned(),
                ];
                text(engine.run(&args).await?)
            }
            Operation::GetRemotes => {
                let out = engine.run(&argv(&["remote", "-v"])).await?;
                Ok(OpOutput::Remotes(RemoteList {
                    remotes: parse::parse_remotes(&out),
                }))
            }
            Operation::RevList { args } => text(engine.run(&with(&["rev-list"], args)).await?),
            Operation::Tag { args } if args.is_empty() => {
                text(engine.run(&argv(&["tag", "-l"])).await?)
            }
            Operation::Tag { args } => text(engine.run(&with(&["tag"], args)).await?),
            Operation::TagList => text(engine.run(&argv(&["tag", "-l"])).await?),
            Operation::TagCreate {
                name,
                message: Some(message),
            } => text(engine.run(&with(&["tag", "-a"], [name, "-m".to_string(), message])).await?),
            Operation::TagCreate {
                name,
                message: None,
            } => text(engine.run(&with(&["tag"], [name])).await?),
            Operation::TagPush {
                remote,
                tag: Some(tag),
            } => text(engine.run(&with(&["push"], [remote, "tag".to_string(), tag])).await?),
            Operation::TagPush { remote, tag: None } => {
                text(engine.run(&with(&["push"], [remote, "--tags".to_string()])).await?)
            }
        }
    }

    /// Push, retrying once with `--set-upstream` when the branch has none.
    async fn push(&self, engine: &dyn Engine, flags: Vec<String>) -> Result<OpOutput, DispatchError> {
        match engine.run(&with(&["push"], flags)).await {
            Ok(out) => Ok(OpOutput::Text(out)),
            Err(EngineError::Failed { message })
                if classify(&message) == FailureKind::MissingUpstream =>
            {
                let branch = self.current_branch(engine).await;
                info!(
                    %branch,
                    remote = %self.settings.default_remote,
                    "push has no upstream, retrying with --set-upstream"
                );
                let retry = with(
                    &["push", "--set-upstream"],
                    [self.settings.default_remote.clone(), branch],
                );
                Ok(OpOutput::Text(engine.run(&retry).await?))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The checked-out branch, or the fallback branch.
    async fn current_branch(&self, engine: &dyn Engine) -> String {
        let listing = engine.run(&argv(&["branch", parse::BRANCH_FORMAT])).await;
        match listing.map(|out| parse::parse_branches(&out).current) {
            Ok(Some(branch)) => branch,
            Ok(None) => self.settings.fallback_branch.clone(),
            Err(e) => {
                debug!(error = %e, "cannot list branches, using fallback branch");
                self.settings.fallback_branch.clone()
            }
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn with(fixed: &[&str], rest: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut args = argv(fixed);
    args.extend(rest);
    args
}

async fn head_exists(engine: &dyn Engine) -> bool {
    engine
        .run(&argv(&["rev-parse", "--verify", "--quiet", "HEAD"]))
        .await
        .is_ok()
}

fn ensure_exists(path: &Path) -> Result<(), DispatchError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DispatchError::PathNotFound(path.to_path_buf()))
    }
}

/// Refuse a non-empty target; create a missing one.
fn prepare_clone_target(target: &Path) -> Result<(), DispatchError> {
    let io = |source| DispatchError::Io {
        path: target.to_path_buf(),
        source,
    };

    if target.is_dir() {
        let mut entries = fs::read_dir(target).map_err(io)?;
        if entries.next().is_some() {
            return Err(DispatchError::TargetNotEmpty(target.to_path_buf()));
        }
        Ok(())
    } else if target.exists() {
        Err(DispatchError::TargetNotEmpty(target.to_path_buf()))
    } else {
        fs::create_dir_all(target).map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Engine double answering from a script and recording every call.
    #[derive(Default)]
    struct Scripted {
        workdir: PathBuf,
        replies: Mutex<VecDeque<Result<String, String>>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl Engine for Scripted {
        fn workdir(&self) -> &Path {
            &self.workdir
        }

        async fn run(&self, args: &[String]) -> Result<String, EngineError> {
            self.calls.lock().unwrap().push(args.to_vec());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(out)) => Ok(out),
                Some(Err(message)) => Err(EngineError::Failed { message }),
                None => Ok(String::new()),
            }
        }
    }

    fn scripted(replies: Vec<Result<&str, &str>>) -> (Dispatcher, Arc<Scripted>) {
        let engine = Arc::new(Scripted {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            ..Default::default()
        });
        let shared = Arc::clone(&engine);
        let registry =
            EngineRegistry::with_factory(move |_: &Path| Arc::clone(&shared) as Arc<dyn Engine>);
        (Dispatcher::new(registry, DispatchSettings::default()), engine)
    }

    fn args(list: &[&str]) -> Vec<String> {
        argv(list)
    }

    #[tokio::test]
    async fn missing_path_fails_before_engine() {
        let (dispatcher, engine) = scripted(vec![]);
        let env = dispatcher
            .dispatch("status", Path::new("/definitely/not/here"), vec![])
            .await;
        assert!(!env.success);
        assert!(env.error.unwrap().starts_with("path does not exist"));
        assert!(engine.calls.lock().unwrap().is_empty());
        assert!(dispatcher.registry().is_empty());
    }

    #[tokio::test]
    async fn request_on_missing_path_is_checked_once_by_execute() {
        let (dispatcher, engine) = scripted(vec![]);
        let missing = Path::new("/definitely/not/here");

        let err = dispatcher
            .execute_request("status", missing, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::PathNotFound(ref p) if p == missing));

        let err = dispatcher
            .execute_request("rebase", missing, vec![])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported git operation: rebase");
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_operation_never_reaches_engine() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![]);
        let env = dispatcher.dispatch("rebase", dir.path(), vec![]).await;
        assert_eq!(env.error.as_deref(), Some("unsupported git operation: rebase"));
        assert!(engine.calls.lock().unwrap().is_empty());
        assert!(dispatcher.registry().is_empty());
    }

    #[tokio::test]
    async fn push_retries_once_with_upstream() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![
            Err("fatal: The current branch feature has no upstream branch."),
            Ok(" \0main\0aaa\0one\n*\0feature\0bbb\0two\n"),
            Ok("pushed"),
        ]);

        let env = dispatcher.dispatch("push", dir.path(), vec![]).await;
        assert!(env.success);
        assert_eq!(env.data, Some(OpOutput::Text("pushed".into())));

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], args(&["push"]));
        assert_eq!(calls[2], args(&["push", "--set-upstream", "origin", "feature"]));
    }

    #[tokio::test]
    async fn failed_retry_is_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![
            Err("fatal: no upstream branch"),
            Ok(""),
            Err("fatal: could not read from remote repository"),
        ]);

        let env = dispatcher.dispatch("push", dir.path(), vec![]).await;
        assert_eq!(env.error.as_deref(), Some("fatal: could not read from remote repository"));
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], args(&["push", "--set-upstream", "origin", "main"]));
    }

    #[tokio::test]
    async fn other_push_failures_are_not_retried() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![Err("error: failed to push some refs")]);
        let env = dispatcher.dispatch("push", dir.path(), vec!["--force".into()]).await;
        assert!(!env.success);
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[args(&["push", "--force"])]);
    }

    #[tokio::test]
    async fn argument_shaping() {
        let dir = TempDir::new().unwrap();
        let cases: Vec<(&str, Vec<&str>, Vec<&str>)> = vec![
            ("add", vec![], vec!["add", "."]),
            ("commit", vec!["msg"], vec!["commit", "-m", "msg"]),
            ("create-branch", vec!["feat"], vec!["checkout", "-b", "feat"]),
            ("fetch", vec![""], vec!["fetch", "origin"]),
            ("diff", vec![], vec!["diff", "--cached"]),
            ("diff-file", vec!["a.rs"], vec!["diff", "a.rs"]),
            ("reset", vec!["a.rs"], vec!["reset", "--", "a.rs"]),
            ("add-remote", vec!["", "u"], vec!["remote", "add", "origin", "u"]),
            ("remote", vec!["get-url", "origin"], vec!["remote", "get-url", "origin"]),
            ("remote", vec!["set-url", "o", "u"], vec!["remote", "set-url", "o", "u"]),
            ("remote", vec!["prune", "o"], vec!["remote", "prune", "o"]),
            ("rev-list", vec!["--count", "HEAD"], vec!["rev-list", "--count", "HEAD"]),
            ("tag", vec![], vec!["tag", "-l"]),
            ("tag", vec!["-d", "v1"], vec!["tag", "-d", "v1"]),
            ("tag-create", vec!["v1", "notes"], vec!["tag", "-a", "v1", "-m", "notes"]),
            ("tag-create", vec!["v1"], vec!["tag", "v1"]),
            ("tag-push", vec![], vec!["push", "origin", "--tags"]),
            ("tag-push", vec!["up", "v1"], vec!["push", "up", "tag", "v1"]),
        ];

        for (op, input, expected) in cases {
            let (dispatcher, engine) = scripted(vec![]);
            let env = dispatcher.dispatch(op, dir.path(), args(&input)).await;
            assert!(env.success, "{op}: {:?}", env.error);
            let calls = engine.calls.lock().unwrap();
            assert_eq!(calls.last().unwrap(), &args(&expected), "{op}");
        }
    }

    #[tokio::test]
    async fn reset_all_falls_back_without_head() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![Err("")]);
        assert!(dispatcher.dispatch("reset", dir.path(), vec![]).await.success);
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls[1], args(&["reset"]));
    }

    #[tokio::test]
    async fn missing_argument_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![]);
        let env = dispatcher.dispatch("commit", dir.path(), vec![]).await;
        assert_eq!(env.error.as_deref(), Some("commit requires a commit message"));
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clone_refuses_non_empty_target() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        fs::write(dir.path().join("taken/file"), "x").unwrap();
        let (dispatcher, engine) = scripted(vec![]);

        let env = dispatcher
            .dispatch("clone", dir.path(), args(&["https://h/o/r.git", "taken"]))
            .await;
        assert!(env.error.unwrap().starts_with("target directory is not empty"));
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clone_creates_missing_target() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, engine) = scripted(vec![]);

        let env = dispatcher
            .dispatch("clone", dir.path(), args(&["https://h/o/r.git", "fresh"]))
            .await;
        assert!(env.success);
        assert!(dir.path().join("fresh").is_dir());
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls[0][0], "clone");
        assert_eq!(PathBuf::from(&calls[0][2]), dir.path().join("fresh"));
    }

    #[tokio::test]
    async fn shutdown_clears_bindings() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, _engine) = scripted(vec![]);
        dispatcher.dispatch("pull", dir.path(), vec![]).await;
        assert_eq!(dispatcher.registry().len(), 1);
        dispatcher.shutdown();
        assert!(dispatcher.registry().is_empty());
    }
}
