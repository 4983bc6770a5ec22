//! core::classify
//!
//! Classification of engine and host-scan failure text.
//!
//! # Design
//!
//! The git and ssh binaries report failures as free-form diagnostics only.
//! Every decision that depends on that text (the push upstream retry, the
//! empty-history coercion, the key-exchange hint, the add-or-update of a
//! remote) goes through
//! [`classify`], so the recognized patterns live in one place.
//!
//! # Example
//!
//! ```
//! use gitdeck::core::classify::{classify, FailureKind};
//!
//! let msg = "fatal: The current branch feature has no upstream branch.";
//! assert_eq!(classify(msg), FailureKind::MissingUpstream);
//!
//! let msg = "fatal: your current branch 'main' does not have any commits yet";
//! assert_eq!(classify(msg), FailureKind::NoCommitsYet);
//! ```

/// The recognized families of failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Push refused because the branch has no upstream configured.
    MissingUpstream,
    /// Read on a repository with an unborn branch.
    NoCommitsYet,
    /// Host key scan failed during key-exchange negotiation.
    UnsupportedKeyExchange,
    /// `remote add` refused because the name is taken.
    RemoteExists,
    /// Anything else; reported verbatim.
    Other,
}

impl FailureKind {
    /// Check if this failure is a benign "no history yet" state.
    pub fn is_benign_empty(&self) -> bool {
        matches!(self, FailureKind::NoCommitsYet)
    }
}

/// Classify a diagnostic message.
///
/// Matching is substring based. Missing-upstream is checked first since git
/// may mention both an unborn branch and a missing upstream in one push
/// failure, and only the retry can fix that case.
pub fn classify(message: &str) -> FailureKind {
    if is_missing_upstream(message) {
        FailureKind::MissingUpstream
    } else if message.contains("does not have any commits yet") {
        FailureKind::NoCommitsYet
    } else if is_unsupported_kex(message) {
        FailureKind::UnsupportedKeyExchange
    } else if message.contains("remote ") && message.contains("already exists") {
        FailureKind::RemoteExists
    } else {
        FailureKind::Other
    }
}

fn is_missing_upstream(message: &str) -> bool {
    message.contains("no upstream branch")
        || message.contains("set-upstream")
        || message.contains("setUpstream")
        || (message.contains("current branch") && message.contains("has no upstream"))
}

fn is_unsupported_kex(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("choose_kex")
        || lower.contains("unsupported kex")
        || lower.contains("unsupported key exchange")
        || lower.contains("no matching key exchange method")
}
