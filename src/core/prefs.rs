//! core::prefs
//!
//! Small key-value preference store.
//!
//! # Storage
//!
//! - Preferences live in `~/.gitdeck/preferences.toml` by default
//! - Each key maps to one string value (structured values are JSON-encoded
//!   by their owner)
//! - All writes are atomic (write to temp file, then rename)
//!
//! # Example
//!
//! ```no_run
//! use gitdeck::core::prefs::PreferenceStore;
//!
//! let store = PreferenceStore::new()?;
//! store.set("theme", "dark")?;
//! assert_eq!(store.get("theme")?.as_deref(), Some("dark"));
//! # Ok::<(), gitdeck::core::prefs::PreferenceError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from preference storage.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to read preferences: {0}")]
    ReadError(String),

    #[error("failed to write preferences: {0}")]
    WriteError(String),

    #[error("invalid value for preference '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Create a store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, PreferenceError> {
        let home = dirs::home_dir()
            .ok_or_else(|| PreferenceError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".gitdeck").join("preferences.toml")))
    }

    /// Create a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one preference.
    pub fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Set one preference, keeping all others.
    pub fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    /// Remove one preference. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| PreferenceError::ReadError(format!("cannot read {}: {}", self.path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| PreferenceError::ReadError(format!("cannot parse {}: {}", self.path.display(), e)))
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PreferenceError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(values)
            .map_err(|e| PreferenceError::WriteError(format!("cannot serialize: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| PreferenceError::WriteError(format!("cannot create temp file: {}", e)))?;

            file.write_all(content.as_bytes())
                .map_err(|e| PreferenceError::WriteError(format!("cannot write: {}", e)))?;

            file.sync_all()
                .map_err(|e| PreferenceError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| PreferenceError::WriteError(format!("cannot rename temp file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::with_path(dir.path().join("nested").join("prefs.toml"))
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).get("anything").unwrap(), None);
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let prefs = store(&dir);

        prefs.set("a", "1").unwrap();
        prefs.set("b", "[\"json\"]").unwrap();
        assert_eq!(prefs.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(prefs.get("b").unwrap().as_deref(), Some("[\"json\"]"));

        prefs.remove("a").unwrap();
        prefs.remove("a").unwrap();
        assert_eq!(prefs.get("a").unwrap(), None);
        assert!(prefs.get("b").unwrap().is_some());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let prefs = store(&dir);
        prefs.set("k", "v").unwrap();
        assert!(prefs.path().exists());
        assert!(!prefs.path().with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let prefs = store(&dir);
        fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
        fs::write(prefs.path(), "not = [valid").unwrap();
        assert!(matches!(prefs.get("k"), Err(PreferenceError::ReadError(_))));
    }
}
