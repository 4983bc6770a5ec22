//! Façade tests over an in-memory engine.
//!
//! The dispatcher runs for real; only the engine binding is scripted, so
//! argument shaping, the upstream retry, coercion and notices are observed
//! end to end without spawning processes.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use gitdeck::client::mock::RecordingNotifier;
use gitdeck::client::{GitClient, NoticeLevel};
use gitdeck::core::envelope::{Envelope, OpOutput};
use gitdeck::core::types::{LogResult, StatusSummary};
use gitdeck::engine::{DispatchSettings, Dispatcher};
use gitdeck::git::{Engine, EngineError, EngineRegistry};

// =============================================================================
// Scripted engine
// =============================================================================

/// Engine replaying canned replies and recording argument vectors.
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

struct Harness {
    _dir: TempDir,
    repo: PathBuf,
    engine: Arc<Scripted>,
    created: Arc<AtomicUsize>,
    client: GitClient<Dispatcher, RecordingNotifier>,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(replies: Vec<Result<&str, &str>>) -> Self {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().to_path_buf();
        let engine = Arc::new(Scripted {
            workdir: repo.clone(),
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        });

        let created = Arc::new(AtomicUsize::new(0));
        let (shared, counter) = (Arc::clone(&engine), Arc::clone(&created));
        let registry = EngineRegistry::with_factory(move |_: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::clone(&shared) as Arc<dyn Engine>
        });

        let notifier = RecordingNotifier::new();
        let client = GitClient::new(
            Dispatcher::new(registry, DispatchSettings::default()),
            notifier.clone(),
        );

        Self {
            _dir: dir,
            repo,
            engine,
            created,
            client,
            notifier,
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.engine.calls.lock().unwrap().clone()
    }
}

fn argv(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Wire form
// =============================================================================

#[test]
fn envelope_wire_forms() {
    let failed = Envelope::err("path does not exist: /nope");
    insta::assert_snapshot!(
        serde_json::to_string(&failed).unwrap(),
        @r#"{"success":false,"error":"path does not exist: /nope"}"#
    );

    let text = Envelope::ok(OpOutput::Text("Already up to date.".into()));
    insta::assert_snapshot!(
        serde_json::to_string(&text).unwrap(),
        @r#"{"success":true,"data":"Already up to date."}"#
    );

    let tags = Envelope::ok(OpOutput::Tags(vec!["v1.0".into(), "v1.1".into()]));
    insta::assert_snapshot!(
        serde_json::to_string(&tags).unwrap(),
        @r#"{"success":true,"data":["v1.0","v1.1"]}"#
    );

    let empty_log = Envelope::ok(OpOutput::Log(LogResult::default()));
    insta::assert_snapshot!(
        serde_json::to_string(&empty_log).unwrap(),
        @r#"{"success":true,"data":{"all":[],"total":0,"latest":null}}"#
    );
}

#[test]
fn wire_form_reads_back() {
    let json = r#"{"success":true,"data":{"all":[],"total":0,"latest":null}}"#;
    let envelope: Envelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.data, Some(OpOutput::Log(LogResult::default())));

    let json = r#"{"success":false,"error":"boom"}"#;
    let envelope: Envelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.error_message(), Some("boom"));
}

// =============================================================================
// Façade over the dispatcher
// =============================================================================

#[tokio::test]
async fn push_retry_is_invisible_to_the_caller() {
    let h = Harness::new(vec![
        Err("fatal: The current branch topic has no upstream branch."),
        Ok("* \0topic\0abc123\0wip\n"),
        Ok(""),
    ]);

    let envelope = h.client.push(&h.repo, &[]).await;
    assert!(envelope.success);
    assert_eq!(
        h.calls().last().unwrap(),
        &argv(&["push", "--set-upstream", "origin", "topic"])
    );
    assert_eq!(
        h.notifier.notices(),
        vec![(NoticeLevel::Success, "Pushed to remote".to_string())]
    );
}

#[tokio::test]
async fn failed_retry_surfaces_its_own_message() {
    let h = Harness::new(vec![
        Err("fatal: The current branch topic has no upstream branch."),
        Ok("* \0topic\0abc123\0wip\n"),
        Err("fatal: 'origin' does not appear to be a git repository"),
    ]);

    let envelope = h.client.push(&h.repo, &[]).await;
    assert_eq!(
        envelope.error_message(),
        Some("fatal: 'origin' does not appear to be a git repository")
    );
    assert_eq!(h.calls().len(), 3);
    assert_eq!(h.notifier.notices()[0].0, NoticeLevel::Error);
}

#[tokio::test]
async fn status_on_unborn_branch_is_coerced() {
    let h = Harness::new(vec![Err(
        "fatal: your current branch 'main' does not have any commits yet",
    )]);

    let envelope = h.client.get_status(&h.repo).await;
    assert!(envelope.success);
    assert_eq!(envelope.data, Some(OpOutput::Status(StatusSummary::default())));
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn unstage_without_head_uses_plain_reset() {
    let h = Harness::new(vec![Err("fatal: Needed a single revision"), Ok("")]);

    assert!(h.client.unstage(&h.repo, None).await.success);
    assert_eq!(
        h.calls(),
        vec![
            argv(&["rev-parse", "--verify", "--quiet", "HEAD"]),
            argv(&["reset"]),
        ]
    );
}

#[tokio::test]
async fn one_binding_serves_every_call_for_a_path() {
    let h = Harness::new(vec![]);

    h.client.get_status(&h.repo).await;
    h.client.get_branches(&h.repo).await;
    h.client.fetch(&h.repo, None).await;

    assert_eq!(h.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.calls()[2], argv(&["fetch", "origin"]));
}

#[tokio::test]
async fn missing_path_never_reaches_the_engine() {
    let h = Harness::new(vec![]);
    let missing = h.repo.join("gone");

    let envelope = h.client.get_status(&missing).await;
    assert!(!envelope.success);
    assert_eq!(h.created.load(Ordering::SeqCst), 0);
    assert!(h.calls().is_empty());
    assert_eq!(
        h.notifier.notices()[0].1,
        format!("git status failed: path does not exist: {}", missing.display())
    );
}
