//! core::envelope
//!
//! The uniform result of every boundary call.
//!
//! # Wire Form
//!
//! ```json
//! {"success": true, "data": { ... }}
//! {"success": false, "error": "path does not exist: /nope"}
//! ```
//!
//! `data` is an [`OpOutput`], serialized untagged so that it is the plain
//! object, array or string the shell expects.

use serde::{Deserialize, Serialize};

use super::types::{BranchSummary, LogResult, RemoteList, StatusSummary};

/// Typed payload of a successful operation.
///
/// Variant order matters for deserialization: structs with the most
/// specific required fields come first. `Tags` is the only array payload,
/// so an empty list reads back as `Tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpOutput {
    Status(StatusSummary),
    Branches(BranchSummary),
    Log(LogResult),
    Remotes(RemoteList),
    Tags(Vec<String>),
    /// Raw engine output
    Text(String),
}

impl OpOutput {
    /// The raw text, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OpOutput::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Result envelope returned across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<OpOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// A successful result carrying `data`.
    pub fn ok(data: OpOutput) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed result carrying a human-readable message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// The error message of a failed envelope.
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.error.as_deref().unwrap_or("unknown error"))
        }
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<Option<OpOutput>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

impl<E: std::fmt::Display> From<Result<OpOutput, E>> for Envelope {
    fn from(result: Result<OpOutput, E>) -> Self {
        match result {
            Ok(data) => Envelope::ok(data),
            Err(e) => Envelope::err(e.to_string()),
        }
    }
}
