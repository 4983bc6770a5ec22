//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the façade, the SSH helper or a core module
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Repository operations and host scans run external processes under
//! tokio. Handlers that need them create a runtime and block on the work,
//! so the dispatch function stays synchronous.

mod completion;
mod config_cmd;
mod gitignore;
mod op;
mod recent;
mod remote;
mod ssh;
mod url;

pub use completion::completion;
pub use config_cmd::{path as config_path, show as config_show};
pub use gitignore::gitignore;
pub use op::{current_branch, next_tag, op, tags};
pub use recent::{add as recent_add, clear as recent_clear, list as recent_list, remove as recent_remove};
pub use remote::{connect as remote_connect, switch as remote_switch};
pub use ssh::{check_key, generate_key, has_host, public_key, trust_host};
pub use url::{to_https, to_ssh};

use crate::cli::args::{Command, ConfigAction, RecentAction, RemoteAction, SshAction, UrlAction};
use crate::core::remote_url::RemoteProtocol;
use crate::client::GitClient;
use crate::engine::{Context, Dispatcher};
use crate::ui::output::{ConsoleNotifier, Verbosity};
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Op { operation, args } => op::op(ctx, &operation, args),
        Command::CurrentBranch => op::current_branch(ctx),
        Command::Tags => op::tags(ctx),
        Command::NextTag => op::next_tag(ctx),

        Command::Remote { action } => match action {
            RemoteAction::UseSsh { name } => remote::switch(ctx, &name, RemoteProtocol::Ssh),
            RemoteAction::UseHttps { name } => remote::switch(ctx, &name, RemoteProtocol::Https),
            RemoteAction::Connect { url, name } => remote::connect(ctx, &name, &url),
        },

        Command::Ssh { action } => match action {
            SshAction::CheckKey => ssh::check_key(ctx),
            SshAction::GenerateKey { identity } => ssh::generate_key(ctx, identity.as_deref()),
            SshAction::PublicKey => ssh::public_key(ctx),
            SshAction::HasHost { host } => ssh::has_host(ctx, &host),
            SshAction::TrustHost { host } => ssh::trust_host(ctx, &host),
        },

        Command::Recent { action } => match action {
            RecentAction::List => recent::list(ctx),
            RecentAction::Add { path } => recent::add(ctx, &path),
            RecentAction::Remove { path } => recent::remove(ctx, &path),
            RecentAction::Clear => recent::clear(ctx),
        },

        Command::Url { action } => match action {
            UrlAction::ToSsh { url } => url::to_ssh(&url),
            UrlAction::ToHttps { url } => url::to_https(&url),
        },

        Command::Gitignore { entry } => gitignore::gitignore(ctx, &entry),

        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },

        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Output verbosity for a context.
pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Build the façade over an in-process dispatcher.
pub(crate) fn client(ctx: &Context) -> GitClient<Dispatcher, ConsoleNotifier> {
    GitClient::new(
        Dispatcher::from_config(&ctx.config),
        ConsoleNotifier::new(verbosity(ctx)),
    )
    .with_fallback_branch(ctx.config.fallback_branch())
}

/// Runtime for one command's async work.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
