//! config command - Show configuration

use crate::core::config::Config;
use crate::engine::Context;
use anyhow::{Context as _, Result};

/// Print the effective configuration as TOML, defaults filled in.
pub fn show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let mut table = toml::Table::new();

    let mut git = toml::Table::new();
    git.insert("binary".into(), config.git_binary().into());
    git.insert(
        "timeout_secs".into(),
        (config.engine_timeout().as_secs() as i64).into(),
    );
    table.insert("git".into(), git.into());

    let mut dispatch = toml::Table::new();
    dispatch.insert("default_remote".into(), config.default_remote().into());
    dispatch.insert("fallback_branch".into(), config.fallback_branch().into());
    dispatch.insert("log_limit".into(), (config.log_limit() as i64).into());
    table.insert("dispatch".into(), dispatch.into());

    let mut ssh = toml::Table::new();
    if let Some(dir) = config.ssh_dir() {
        ssh.insert("dir".into(), dir.display().to_string().into());
    }
    ssh.insert("builtin_host_keys".into(), config.builtin_host_keys().into());
    table.insert("ssh".into(), ssh.into());

    if let Some(path) = config.recent_path() {
        let mut recent = toml::Table::new();
        recent.insert("path".into(), path.display().to_string().into());
        table.insert("recent".into(), recent.into());
    }

    let rendered = toml::to_string_pretty(&table).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

/// Print the file the configuration came from, or where it would go.
pub fn path(ctx: &Context) -> Result<()> {
    let path = match ctx.config.loaded_from() {
        Some(path) => path.to_path_buf(),
        None => Config::canonical_path()?,
    };
    println!("{}", path.display());
    Ok(())
}
