//! core::recent
//!
//! Recently opened repositories.
//!
//! The list is stored JSON-encoded under a single preference key. It holds
//! at most [`RECENT_LIMIT`] entries, newest first, and never two entries with
//! the same path.
//!
//! # Example
//!
//! ```
//! use gitdeck::core::prefs::PreferenceStore;
//! use gitdeck::core::recent::RecentRepos;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let recent = RecentRepos::new(PreferenceStore::with_path(dir.path().join("prefs.toml")));
//!
//! recent.add("/work/app").unwrap();
//! recent.add("/work/app").unwrap();
//! let list = recent.list().unwrap();
//! assert_eq!(list.len(), 1);
//! assert_eq!(list[0].name, "app");
//! ```

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::prefs::{PreferenceError, PreferenceStore};

/// Preference key holding the list.
pub const RECENT_KEY: &str = "recent_repositories";

/// Maximum number of remembered repositories.
pub const RECENT_LIMIT: usize = 5;

/// One remembered repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentRepo {
    /// Creation time in epoch milliseconds
    pub id: i64,
    /// Last path segment
    pub name: String,
    pub path: String,
    pub status: String,
}

impl RecentRepo {
    /// Create an entry for `path`, stamped now.
    pub fn new(path: &str) -> Self {
        Self {
            id: Utc::now().timestamp_millis(),
            name: display_name(path),
            path: path.to_string(),
            status: "clean".to_string(),
        }
    }
}

/// Last segment of a path, accepting both separators.
fn display_name(path: &str) -> String {
    path.trim_end_matches(&['/', '\\'][..])
        .rsplit(&['/', '\\'][..])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// The recent-repository list.
#[derive(Debug, Clone)]
pub struct RecentRepos {
    store: PreferenceStore,
}

impl RecentRepos {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    /// Entries, newest first. A missing or empty key reads as an empty list.
    pub fn list(&self) -> Result<Vec<RecentRepo>, PreferenceError> {
        match self.store.get(RECENT_KEY)? {
            Some(json) if !json.trim().is_empty() => {
                serde_json::from_str(&json).map_err(|e| PreferenceError::InvalidValue {
                    key: RECENT_KEY.to_string(),
                    message: e.to_string(),
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Remember `path`.
    ///
    /// Returns `false` without changing anything if the path is already
    /// present. Otherwise the entry goes first and the oldest entries beyond
    /// the limit are dropped.
    pub fn add(&self, path: impl AsRef<Path>) -> Result<bool, PreferenceError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let mut list = self.list()?;
        if list.iter().any(|repo| repo.path == path) {
            return Ok(false);
        }

        list.insert(0, RecentRepo::new(&path));
        list.truncate(RECENT_LIMIT);
        self.save(&list)?;
        Ok(true)
    }

    /// Forget `path`. Returns whether it was present.
    pub fn remove(&self, path: impl AsRef<Path>) -> Result<bool, PreferenceError> {
        let path = path.as_ref().to_string_lossy();
        let mut list = self.list()?;
        let before = list.len();
        list.retain(|repo| repo.path != path);
        if list.len() == before {
            return Ok(false);
        }
        self.save(&list)?;
        Ok(true)
    }

    /// Forget everything.
    pub fn clear(&self) -> Result<(), PreferenceError> {
        self.store.remove(RECENT_KEY)
    }

    fn save(&self, list: &[RecentRepo]) -> Result<(), PreferenceError> {
        let json = serde_json::to_string(list).map_err(|e| PreferenceError::InvalidValue {
            key: RECENT_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(RECENT_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn recent(dir: &TempDir) -> RecentRepos {
        RecentRepos::new(PreferenceStore::with_path(dir.path().join("prefs.toml")))
    }

    #[test]
    fn names_from_either_separator() {
        assert_eq!(display_name("/home/me/proj"), "proj");
        assert_eq!(display_name("C:\\Users\\me\\proj"), "proj");
        assert_eq!(display_name("/home/me/proj/"), "proj");
        assert_eq!(display_name("proj"), "proj");
    }

    #[test]
    fn newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let recent = recent(&dir);
        for i in 0..7 {
            assert!(recent.add(format!("/r/{i}")).unwrap());
        }
        let paths: Vec<_> = recent.list().unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/r/6", "/r/5", "/r/4", "/r/3", "/r/2"]);
    }

    #[test]
    fn duplicate_add_keeps_position() {
        let dir = TempDir::new().unwrap();
        let recent = recent(&dir);
        recent.add("/a").unwrap();
        recent.add("/b").unwrap();
        assert!(!recent.add("/a").unwrap());
        let paths: Vec<_> = recent.list().unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let recent = recent(&dir);
        recent.add("/a").unwrap();
        recent.add("/b").unwrap();
        assert!(recent.remove("/a").unwrap());
        assert!(!recent.remove("/a").unwrap());
        assert_eq!(recent.list().unwrap().len(), 1);
        recent.clear().unwrap();
        assert!(recent.list().unwrap().is_empty());
    }

    #[test]
    fn entries_are_stored_as_json() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::with_path(dir.path().join("prefs.toml"));
        RecentRepos::new(store.clone()).add("/x/y").unwrap();
        let raw = store.get(RECENT_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["name"], "y");
        assert_eq!(value[0]["status"], "clean");
    }
}
