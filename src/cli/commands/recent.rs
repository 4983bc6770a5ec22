//! recent command - The recent-repositories list

use std::path::Path;

use super::verbosity;
use crate::core::prefs::PreferenceStore;
use crate::core::recent::RecentRepos;
use crate::engine::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

fn repos(ctx: &Context) -> Result<RecentRepos> {
    let store = match ctx.config.recent_path() {
        Some(path) => PreferenceStore::with_path(path.to_path_buf()),
        None => PreferenceStore::new().context("Failed to locate preference file")?,
    };
    Ok(RecentRepos::new(store))
}

/// Print the list as JSON, newest first.
pub fn list(ctx: &Context) -> Result<()> {
    let list = repos(ctx)?.list()?;
    output::print_json(&list).context("Failed to encode result")?;
    Ok(())
}

/// Remember a repository.
pub fn add(ctx: &Context, path: &Path) -> Result<()> {
    if repos(ctx)?.add(path)? {
        output::success(format!("Added {}", path.display()), verbosity(ctx));
    } else {
        output::print(format!("{} is already listed", path.display()), verbosity(ctx));
    }
    Ok(())
}

/// Forget a repository.
pub fn remove(ctx: &Context, path: &Path) -> Result<()> {
    if repos(ctx)?.remove(path)? {
        output::success(format!("Removed {}", path.display()), verbosity(ctx));
    } else {
        output::print(format!("{} was not listed", path.display()), verbosity(ctx));
    }
    Ok(())
}

/// Forget everything.
pub fn clear(ctx: &Context) -> Result<()> {
    repos(ctx)?.clear()?;
    output::success("Cleared recent repositories", verbosity(ctx));
    Ok(())
}
