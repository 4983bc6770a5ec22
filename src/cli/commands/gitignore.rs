//! gitignore command - Append an entry to .gitignore

use super::verbosity;
use crate::core::gitignore::ensure_entry;
use crate::engine::Context;
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Add `entry` to the repository's `.gitignore` unless it is there.
pub fn gitignore(ctx: &Context, entry: &str) -> Result<()> {
    let entry = entry.trim();
    if entry.is_empty() {
        bail!("Entry must not be empty");
    }

    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    if !repo.is_dir() {
        bail!("Not a directory: {}", repo.display());
    }

    if ensure_entry(&repo, entry).context("Failed to update .gitignore")? {
        output::success(format!("Added {} to .gitignore", entry), verbosity(ctx));
    } else {
        output::print(format!("{} is already ignored", entry), verbosity(ctx));
    }
    Ok(())
}
