//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--repo <path>`: Repository to act on (defaults to the current directory)
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::gitignore::NODE_MODULES;
use crate::core::operation::DEFAULT_REMOTE;

/// gitdeck - operation dispatch core for a point-and-click git client
#[derive(Parser, Debug)]
#[command(name = "gitdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository to act on (defaults to the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a named operation and print its result envelope
    #[command(
        name = "op",
        long_about = "Run one boundary operation against the repository and print \
            the result envelope as JSON.\n\n\
            Operations: init, status, add, commit, log, pull, push, branch, checkout, \
            create-branch, fetch, diff, diff-file, show, reset, unstage, add-remote, \
            remote, clone, get-remotes, rev-list, tag, tag-list, tag-create, tag-push.",
        after_help = "\
EXAMPLES:
    gitdeck op status
    gitdeck op add .
    gitdeck op commit 'Fix typo'
    gitdeck --repo ~/work op push --force-with-lease
    gitdeck --repo ~/work op clone git@github.com:owner/app.git app"
    )]
    Op {
        /// Operation name
        operation: String,

        /// Positional arguments for the operation
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the current branch name
    #[command(name = "current-branch")]
    CurrentBranch,

    /// List tags
    Tags,

    /// Suggest the next release tag (vMAJOR.MINOR.PATCH, patch bumped)
    #[command(name = "next-tag")]
    NextTag,

    /// Switch or connect a repository remote
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },

    /// Manage the SSH key pair and trusted hosts
    Ssh {
        #[command(subcommand)]
        action: SshAction,
    },

    /// Manage the recent-repositories list
    Recent {
        #[command(subcommand)]
        action: RecentAction,
    },

    /// Convert remote URLs between protocols
    Url {
        #[command(subcommand)]
        action: UrlAction,
    },

    /// Add an entry to the repository's .gitignore
    Gitignore {
        /// Entry to add
        #[arg(default_value = NODE_MODULES)]
        entry: String,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    gitdeck completion bash >> ~/.bashrc

    # Zsh
    gitdeck completion zsh > \"${fpath[1]}/_gitdeck\""
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// SSH subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SshAction {
    /// Report whether the key pair exists
    CheckKey,
    /// Generate a new RSA key pair
    GenerateKey {
        /// Identity comment, usually an email address
        #[arg(long, short = 'C')]
        identity: Option<String>,
    },
    /// Print the public key
    PublicKey,
    /// Check whether a host is in known_hosts
    HasHost {
        /// Host name
        host: String,
    },
    /// Add a host's key to known_hosts
    TrustHost {
        /// Host name
        host: String,
    },
}

/// Remote subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RemoteAction {
    /// Rewrite the remote URL to SSH and trust its host
    UseSsh {
        /// Remote name
        #[arg(long, default_value = DEFAULT_REMOTE)]
        name: String,
    },
    /// Rewrite the remote URL to HTTPS
    UseHttps {
        /// Remote name
        #[arg(long, default_value = DEFAULT_REMOTE)]
        name: String,
    },
    /// Point the remote at a URL, adding it if needed
    Connect {
        /// Remote URL
        url: String,
        /// Remote name
        #[arg(long, default_value = DEFAULT_REMOTE)]
        name: String,
    },
}

/// Recent-repository subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RecentAction {
    /// List remembered repositories, newest first
    List,
    /// Remember a repository
    Add {
        /// Repository path
        path: PathBuf,
    },
    /// Forget a repository
    Remove {
        /// Repository path
        path: PathBuf,
    },
    /// Forget all repositories
    Clear,
}

/// URL conversion subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UrlAction {
    /// Convert to the SSH form
    ToSsh {
        /// Remote URL
        url: String,
    },
    /// Convert to the HTTPS form
    ToHttps {
        /// Remote URL
        url: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
