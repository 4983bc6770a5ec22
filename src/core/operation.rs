//! core::operation
//!
//! The closed set of repository operations and their typed arguments.
//!
//! # Wire Form
//!
//! Callers name an operation with a string and pass positional string
//! arguments, the way the desktop shell sends them:
//!
//! ```text
//! ("tag-create", "/path/to/repo", ["v1.2.3", "release notes"])
//! ```
//!
//! [`Operation::from_request`] turns that into a typed [`Operation`]. Names
//! must match exactly; anything outside [`OperationName::ALL`] is rejected
//! before an engine is ever resolved.
//!
//! # Example
//!
//! ```
//! use gitdeck::core::operation::{Operation, OperationName, RequestError};
//!
//! let op = Operation::from_request("commit", vec!["Initial commit".into()]).unwrap();
//! assert_eq!(op.name(), OperationName::Commit);
//!
//! let err = Operation::from_request("rebase", vec![]).unwrap_err();
//! assert!(matches!(err, RequestError::Unsupported(_)));
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote used when a caller leaves the remote argument empty.
pub const DEFAULT_REMOTE: &str = "origin";

/// Errors from turning a request into an [`Operation`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The operation name is not part of the supported set.
    #[error("unsupported git operation: {0}")]
    Unsupported(String),

    /// A mandatory positional argument is missing or empty.
    #[error("{operation} requires {argument}")]
    MissingArgument {
        /// Operation being requested
        operation: OperationName,
        /// Human name of the missing argument
        argument: &'static str,
    },
}

/// Names of every supported operation, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationName {
    Init,
    Status,
    Add,
    Commit,
    Log,
    Pull,
    Push,
    Branch,
    Checkout,
    CreateBranch,
    Fetch,
    Diff,
    DiffFile,
    Show,
    Reset,
    Unstage,
    AddRemote,
    Remote,
    Clone,
    GetRemotes,
    RevList,
    Tag,
    TagList,
    TagCreate,
    TagPush,
}

impl OperationName {
    /// Every supported operation.
    pub const ALL: [OperationName; 25] = [
        OperationName::Init,
        OperationName::Status,
        OperationName::Add,
        OperationName::Commit,
        OperationName::Log,
        OperationName::Pull,
        OperationName::Push,
        OperationName::Branch,
        OperationName::Checkout,
        OperationName::CreateBranch,
        OperationName::Fetch,
        OperationName::Diff,
        OperationName::DiffFile,
        OperationName::Show,
        OperationName::Reset,
        OperationName::Unstage,
        OperationName::AddRemote,
        OperationName::Remote,
        OperationName::Clone,
        OperationName::GetRemotes,
        OperationName::RevList,
        OperationName::Tag,
        OperationName::TagList,
        OperationName::TagCreate,
        OperationName::TagPush,
    ];

    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationName::Init => "init",
            OperationName::Status => "status",
            OperationName::Add => "add",
            OperationName::Commit => "commit",
            OperationName::Log => "log",
            OperationName::Pull => "pull",
            OperationName::Push => "push",
            OperationName::Branch => "branch",
            OperationName::Checkout => "checkout",
            OperationName::CreateBranch => "create-branch",
            OperationName::Fetch => "fetch",
            OperationName::Diff => "diff",
            OperationName::DiffFile => "diff-file",
            OperationName::Show => "show",
            OperationName::Reset => "reset",
            OperationName::Unstage => "unstage",
            OperationName::AddRemote => "add-remote",
            OperationName::Remote => "remote",
            OperationName::Clone => "clone",
            OperationName::GetRemotes => "get-remotes",
            OperationName::RevList => "rev-list",
            OperationName::Tag => "tag",
            OperationName::TagList => "tag-list",
            OperationName::TagCreate => "tag-create",
            OperationName::TagPush => "tag-push",
        }
    }

    /// Whether a successful run changes the repository or its remotes.
    ///
    /// The façade announces success for these.
    pub fn announces_success(&self) -> bool {
        matches!(
            self,
            OperationName::Init
                | OperationName::Add
                | OperationName::Commit
                | OperationName::Pull
                | OperationName::Push
                | OperationName::Checkout
                | OperationName::CreateBranch
                | OperationName::Fetch
                | OperationName::TagCreate
                | OperationName::TagPush
        )
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationName {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| RequestError::Unsupported(s.to_string()))
    }
}

/// Sub-commands of the `remote` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// `remote get-url <name>`
    GetUrl { name: String },
    /// `remote set-url <name> <url>`
    SetUrl { name: String, url: String },
    /// Anything else, handed to `git remote` unchanged.
    Passthrough(Vec<String>),
}

/// A fully typed operation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Init,
    Status,
    Add { pathspec: String },
    Commit { message: String },
    Log,
    Pull,
    Push { flags: Vec<String> },
    Branch,
    Checkout { branch: String },
    CreateBranch { branch: String },
    Fetch { remote: String },
    Diff { target: Option<String> },
    DiffFile { path: String },
    Show { object: String },
    Reset { path: Option<String> },
    Unstage { path: String },
    AddRemote { name: String, url: String },
    Remote(RemoteCommand),
    Clone { url: String, target: PathBuf },
    GetRemotes,
    RevList { args: Vec<String> },
    Tag { args: Vec<String> },
    TagList,
    TagCreate { name: String, message: Option<String> },
    TagPush { remote: String, tag: Option<String> },
}

impl Operation {
    /// Build an operation from its wire name and positional arguments.
    ///
    /// Empty strings count as absent, matching how the shell passes
    /// optional arguments.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Unsupported`] for names outside the closed set
    /// - [`RequestError::MissingArgument`] when a mandatory argument is absent
    pub fn from_request(name: &str, args: Vec<String>) -> Result<Self, RequestError> {
        let name: OperationName = name.parse()?;
        let mut args = Args::new(name, args);

        let op = match name {
            OperationName::Init => Operation::Init,
            OperationName::Status => Operation::Status,
            OperationName::Add => Operation::Add {
                pathspec: args.optional(0).unwrap_or_else(|| ".".to_string()),
            },
            OperationName::Commit => Operation::Commit {
                message: args.required(0, "a commit message")?,
            },
            OperationName::Log => Operation::Log,
            OperationName::Pull => Operation::Pull,
            OperationName::Push => Operation::Push { flags: args.rest(0) },
            OperationName::Branch => Operation::Branch,
            OperationName::Checkout => Operation::Checkout {
                branch: args.required(0, "a branch name")?,
            },
            OperationName::CreateBranch => Operation::CreateBranch {
                branch: args.required(0, "a branch name")?,
            },
            OperationName::Fetch => Operation::Fetch {
                remote: args.optional(0).unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            },
            OperationName::Diff => Operation::Diff {
                target: args.optional(0),
            },
            OperationName::DiffFile => Operation::DiffFile {
                path: args.required(0, "a file path")?,
            },
            OperationName::Show => Operation::Show {
                object: args.required(0, "a revision or path")?,
            },
            OperationName::Reset => Operation::Reset {
                path: args.optional(0),
            },
            OperationName::Unstage => Operation::Unstage {
                path: args.required(0, "a file path")?,
            },
            OperationName::AddRemote => Operation::AddRemote {
                name: args.optional(0).unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
                url: args.required(1, "a remote url")?,
            },
            OperationName::Remote => Operation::Remote(args.remote_command()),
            OperationName::Clone => Operation::Clone {
                url: args.required(0, "a repository url")?,
                target: PathBuf::from(args.required(1, "a target path")?),
            },
            OperationName::GetRemotes => Operation::GetRemotes,
            OperationName::RevList => Operation::RevList { args: args.rest(0) },
            OperationName::Tag => Operation::Tag { args: args.rest(0) },
            OperationName::TagList => Operation::TagList,
            OperationName::TagCreate => Operation::TagCreate {
                name: args.required(0, "a tag name")?,
                message: args.optional(1),
            },
            OperationName::TagPush => Operation::TagPush {
                remote: args.optional(0).unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
                tag: args.optional(1),
            },
        };

        Ok(op)
    }

    /// The wire name of this operation.
    pub fn name(&self) -> OperationName {
        match self {
            Operation::Init => OperationName::Init,
            Operation::Status => OperationName::Status,
            Operation::Add { .. } => OperationName::Add,
            Operation::Commit { .. } => OperationName::Commit,
            Operation::Log => OperationName::Log,
            Operation::Pull => OperationName::Pull,
            Operation::Push { .. } => OperationName::Push,
            Operation::Branch => OperationName::Branch,
            Operation::Checkout { .. } => OperationName::Checkout,
            Operation::CreateBranch { .. } => OperationName::CreateBranch,
            Operation::Fetch { .. } => OperationName::Fetch,
            Operation::Diff { .. } => OperationName::Diff,
            Operation::DiffFile { .. } => OperationName::DiffFile,
            Operation::Show { .. } => OperationName::Show,
            Operation::Reset { .. } => OperationName::Reset,
            Operation::Unstage { .. } => OperationName::Unstage,
            Operation::AddRemote { .. } => OperationName::AddRemote,
            Operation::Remote(_) => OperationName::Remote,
            Operation::Clone { .. } => OperationName::Clone,
            Operation::GetRemotes => OperationName::GetRemotes,
            Operation::RevList { .. } => OperationName::RevList,
            Operation::Tag { .. } => OperationName::Tag,
            Operation::TagList => OperationName::TagList,
            Operation::TagCreate { .. } => OperationName::TagCreate,
            Operation::TagPush { .. } => OperationName::TagPush,
        }
    }
}

/// Positional argument reader for one request.
struct Args {
    operation: OperationName,
    values: Vec<String>,
}

impl Args {
    fn new(operation: OperationName, values: Vec<String>) -> Self {
        Self { operation, values }
    }

    fn optional(&mut self, index: usize) -> Option<String> {
        self.values
            .get_mut(index)
            .filter(|v| !v.is_empty())
            .map(std::mem::take)
    }

    fn required(&mut self, index: usize, argument: &'static str) -> Result<String, RequestError> {
        self.optional(index).ok_or(RequestError::MissingArgument {
            operation: self.operation,
            argument,
        })
    }

    fn rest(&mut self, from: usize) -> Vec<String> {
        if from >= self.values.len() {
            return Vec::new();
        }
        self.values.split_off(from)
    }

    /// Sub-dispatch for `remote`: recognized forms need all their operands,
    /// otherwise the whole argument list passes through.
    fn remote_command(&mut self) -> RemoteCommand {
        let values = &self.values;
        let non_empty = |i: usize| values.get(i).is_some_and(|v| !v.is_empty());

        match values.first().map(String::as_str) {
            Some("get-url") if non_empty(1) => RemoteCommand::GetUrl {
                name: values[1].clone(),
            },
            Some("set-url") if non_empty(1) && values.len() >= 3 => RemoteCommand::SetUrl {
                name: values[1].clone(),
                url: values[2].clone(),
            },
            _ => RemoteCommand::Passthrough(std::mem::take(&mut self.values)),
        }
    }
}
