//! client::mock
//!
//! Deterministic doubles for the façade seams.
//!
//! # Design
//!
//! [`StubTransport`] answers calls from a per-operation table of envelopes
//! and records every call. [`RecordingNotifier`] keeps notices in memory.
//! Both share their state across clones so a test can keep a handle after
//! moving one into a [`GitClient`](super::GitClient).
//!
//! # Example
//!
//! ```
//! use gitdeck::client::mock::{RecordingNotifier, StubTransport};
//! use gitdeck::client::GitClient;
//! use gitdeck::core::envelope::Envelope;
//! use std::path::Path;
//!
//! # tokio_test::block_on(async {
//! let transport = StubTransport::new();
//! transport.respond("pull", Envelope::err("fatal: network is unreachable"));
//!
//! let notifier = RecordingNotifier::new();
//! let client = GitClient::new(transport, notifier.clone());
//! assert!(!client.pull(Path::new("/repo")).await.success);
//! assert_eq!(notifier.notices().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{NoticeLevel, Notifier, Transport};
use crate::core::envelope::{Envelope, OpOutput};

/// Transport answering from a table; unknown operations succeed with
/// empty text.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    inner: Arc<Mutex<StubInner>>,
}

#[derive(Debug, Default)]
struct StubInner {
    responses: HashMap<String, Envelope>,
    calls: Vec<(String, Vec<String>)>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `operation` with `envelope`.
    pub fn respond(&self, operation: &str, envelope: Envelope) {
        self.lock().responses.insert(operation.to_string(), envelope);
    }

    /// Calls received so far, as `(operation, args)`.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StubInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn call(&self, operation: &str, _repo: &Path, args: Vec<String>) -> Envelope {
        let mut inner = self.lock();
        inner.calls.push((operation.to_string(), args));
        inner
            .responses
            .get(operation)
            .cloned()
            .unwrap_or_else(|| Envelope::ok(OpOutput::Text(String::new())))
    }
}

/// Notifier that stores notices in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<(NoticeLevel, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices raised so far, oldest first.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}
