//! core::types
//!
//! Result schema for operations that return structured data.
//!
//! # Types
//!
//! - [`StatusSummary`] - Working tree and index state
//! - [`LogResult`] - Commit history page
//! - [`BranchSummary`] - Local branches and the checked-out one
//! - [`RemoteList`] - Configured remotes with their fetch/push URLs
//!
//! All types are plain data and serialize to the JSON shapes the desktop
//! shell renders. Field names follow that contract (`not_added`,
//! `working_dir`, `all`), not Rust naming habits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A file entry in a status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Path relative to the repository root (new path for renames)
    pub path: String,
    /// Index status code (first porcelain column)
    pub index: String,
    /// Working tree status code (second porcelain column)
    pub working_dir: String,
}

/// A rename recorded in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub from: String,
    pub to: String,
}

/// Working tree status.
///
/// Files can appear in more than one list: a file modified in both index
/// and working tree is in `staged` and `modified`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Checked-out branch, if any
    pub current: Option<String>,
    /// Upstream tracking branch, if any
    pub tracking: Option<String>,
    /// Commits ahead of upstream
    pub ahead: u32,
    /// Commits behind upstream
    pub behind: u32,
    /// Paths with staged changes
    pub staged: Vec<String>,
    /// Paths modified in index or working tree
    pub modified: Vec<String>,
    /// Untracked paths
    pub not_added: Vec<String>,
    /// Deleted paths
    pub deleted: Vec<String>,
    /// Paths newly added to the index
    pub created: Vec<String>,
    /// Renames in the index
    pub renamed: Vec<RenamedFile>,
    /// Paths with unresolved conflicts
    pub conflicted: Vec<String>,
    /// Every entry with its raw status codes
    pub files: Vec<FileStatus>,
}

impl StatusSummary {
    /// Check if there is nothing staged, modified, untracked or conflicted.
    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if there are staged changes ready to commit.
    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// One commit in a log listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Full commit hash
    pub hash: String,
    /// Author date, strict ISO 8601
    pub date: String,
    /// Subject line
    pub message: String,
    /// Ref decorations (e.g. `HEAD -> main, tag: v1.0`)
    pub refs: String,
    /// Message body after the subject
    pub body: String,
    pub author_name: String,
    pub author_email: String,
}

/// A page of commit history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResult {
    /// Commits, newest first
    pub all: Vec<LogEntry>,
    /// Number of commits in `all`
    pub total: usize,
    /// Newest commit
    pub latest: Option<LogEntry>,
}

impl LogResult {
    /// Build a log result from entries ordered newest first.
    pub fn from_entries(all: Vec<LogEntry>) -> Self {
        Self {
            total: all.len(),
            latest: all.first().cloned(),
            all,
        }
    }
}

/// A local branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    /// Whether this branch is checked out
    pub current: bool,
    /// Short branch name
    pub name: String,
    /// Tip commit hash
    pub commit: String,
    /// Subject of the tip commit
    pub label: String,
}

/// Local branch listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    /// Checked-out branch name (absent on a detached HEAD or unborn branch)
    pub current: Option<String>,
    /// Whether HEAD is detached
    pub detached: bool,
    /// All branch names in listing order
    pub all: Vec<String>,
    /// Branch details by name
    pub branches: BTreeMap<String, BranchEntry>,
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Fetch URL
    pub fetch: String,
    /// Push URL (same as fetch unless configured separately)
    pub push: String,
}

/// Configured remotes, wrapped so the payload is an object on the wire.
///
/// A bare array would be indistinguishable from an empty tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteList {
    pub remotes: Vec<RemoteEntry>,
}

impl RemoteList {
    /// The remote called `name`, if configured.
    pub fn get(&self, name: &str) -> Option<&RemoteEntry> {
        self.remotes.iter().find(|remote| remote.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> LogEntry {
        LogEntry {
            hash: hash.to_string(),
            date: "2024-01-01T00:00:00+00:00".to_string(),
            message: "msg".to_string(),
            refs: String::new(),
            body: String::new(),
            author_name: "A".to_string(),
            author_email: "a@example.com".to_string(),
        }
    }

    #[test]
    fn default_status_is_clean() {
        let status = StatusSummary::default();
        assert!(status.is_clean());
        assert!(!status.has_staged());
    }

    #[test]
    fn log_result_counts_and_latest() {
        let log = LogResult::from_entries(vec![entry("b"), entry("a")]);
        assert_eq!(log.total, 2);
        assert_eq!(log.latest.unwrap().hash, "b");
    }

    #[test]
    fn remote_lookup_by_name() {
        let list = RemoteList {
            remotes: vec![RemoteEntry {
                name: "origin".into(),
                fetch: "git@h:a/b.git".into(),
                push: "git@h:a/b.git".into(),
            }],
        };
        assert!(list.contains("origin"));
        assert!(!list.contains("upstream"));
        assert_eq!(list.get("origin").map(|r| r.fetch.as_str()), Some("git@h:a/b.git"));
    }

    #[test]
    fn empty_log_serializes_with_empty_all() {
        let json = serde_json::to_value(LogResult::default()).unwrap();
        assert_eq!(json["all"], serde_json::json!([]));
        assert_eq!(json["total"], 0);
        assert!(json["latest"].is_null());
    }
}
