//! core::version_tag
//!
//! Next release tag suggestion from existing `vMAJOR.MINOR.PATCH` tags.
//!
//! Only tags of exactly that shape count; anything else (`v1.2`,
//! `release-3`, `v1.2.3-rc1`) is ignored. The suggestion bumps the patch
//! number of the highest version, or starts at [`INITIAL_TAG`].
//!
//! # Example
//!
//! ```
//! use gitdeck::core::version_tag::next_tag;
//!
//! assert_eq!(next_tag(&["v1.9.0", "v1.10.2", "nightly"]), "v1.10.3");
//! assert_eq!(next_tag::<&str>(&[]), "v1.0.0");
//! ```

use std::fmt;

/// Suggested tag when no version tag exists yet.
pub const INITIAL_TAG: &str = "v1.0.0";

/// A parsed `vMAJOR.MINOR.PATCH` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Parse a tag of the exact form `v<digits>.<digits>.<digits>`.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut parts = tag.trim().strip_prefix('v')?.split('.');
        let major = number(parts.next()?)?;
        let minor = number(parts.next()?)?;
        let patch = number(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// The same version with the patch number incremented.
    pub fn bump_patch(self) -> Self {
        Self {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn number(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Highest version among `tags`, compared numerically.
pub fn latest<S: AsRef<str>>(tags: &[S]) -> Option<Version> {
    tags.iter().filter_map(|t| Version::parse(t.as_ref())).max()
}

/// The tag to suggest for the next release.
pub fn next_tag<S: AsRef<str>>(tags: &[S]) -> String {
    match latest(tags) {
        Some(version) => version.bump_patch().to_string(),
        None => INITIAL_TAG.to_string(),
    }
}
