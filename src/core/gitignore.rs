//! core::gitignore
//!
//! Keep well-known build directories out of the index.
//!
//! Opening a JavaScript project and staging everything would otherwise add
//! thousands of files under `node_modules/`. [`ensure_entry`] adds a line to
//! the repository's `.gitignore` only when an identical line is missing.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Entry ensured by default.
pub const NODE_MODULES: &str = "node_modules/";

/// Ensure `entry` is a line of `<repo>/.gitignore`.
///
/// Creates the file if needed. Returns `true` if the file was modified.
pub fn ensure_entry(repo: &Path, entry: &str) -> io::Result<bool> {
    let path = repo.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{}", entry)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_entry(dir.path(), NODE_MODULES).unwrap());
        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "node_modules/\n");
    }

    #[test]
    fn appends_after_unterminated_line() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target").unwrap();
        assert!(ensure_entry(dir.path(), NODE_MODULES).unwrap());
        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target\nnode_modules/\n");
    }

    #[test]
    fn existing_entry_is_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "dist\n  node_modules/  \n").unwrap();
        assert!(!ensure_entry(dir.path(), NODE_MODULES).unwrap());
    }
}
