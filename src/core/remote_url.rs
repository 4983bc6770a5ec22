//! core::remote_url
//!
//! Conversion between the two remote URL shapes the client understands.
//!
//! - HTTPS: `https://<host>/<path>.git`
//! - Secure shell: `<user>@<host>:<path>.git`
//!
//! Conversion is a pure string transform. Input that does not match one of
//! the canonical shapes exactly comes back unchanged.
//!
//! # Example
//!
//! ```
//! use gitdeck::core::remote_url::{to_https, to_ssh};
//!
//! let ssh = to_ssh("https://github.com/alice/proj.git");
//! assert_eq!(ssh, "git@github.com:alice/proj.git");
//! assert_eq!(to_https(&ssh), "https://github.com/alice/proj.git");
//!
//! // Not canonical: returned as-is
//! assert_eq!(to_ssh("https://github.com/alice/proj"), "https://github.com/alice/proj");
//! ```

use serde::{Deserialize, Serialize};

/// User name used when producing secure-shell URLs.
pub const DEFAULT_SSH_USER: &str = "git";

/// The protocol a remote URL uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProtocol {
    Https,
    Ssh,
    Unknown,
}

impl std::fmt::Display for RemoteProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteProtocol::Https => write!(f, "HTTPS"),
            RemoteProtocol::Ssh => write!(f, "SSH"),
            RemoteProtocol::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detect the protocol of a remote URL from its canonical shape.
pub fn protocol(url: &str) -> RemoteProtocol {
    if parse_https(url).is_some() {
        RemoteProtocol::Https
    } else if parse_ssh(url).is_some() {
        RemoteProtocol::Ssh
    } else {
        RemoteProtocol::Unknown
    }
}

/// Convert an HTTPS remote to its secure-shell form.
pub fn to_ssh(url: &str) -> String {
    match parse_https(url) {
        Some((host, path)) => format!("{}@{}:{}.git", DEFAULT_SSH_USER, host, path),
        None => url.to_string(),
    }
}

/// Convert a secure-shell remote to its HTTPS form.
pub fn to_https(url: &str) -> String {
    match parse_ssh(url) {
        Some((host, path)) => format!("https://{}/{}.git", host, path),
        None => url.to_string(),
    }
}

/// Convert `url` to the `target` protocol.
///
/// Returns `None` when either side is [`RemoteProtocol::Unknown`]; a URL
/// already in the target form comes back unchanged.
pub fn convert(url: &str, target: RemoteProtocol) -> Option<String> {
    match (protocol(url), target) {
        (RemoteProtocol::Unknown, _) | (_, RemoteProtocol::Unknown) => None,
        (_, RemoteProtocol::Ssh) => Some(to_ssh(url)),
        (_, RemoteProtocol::Https) => Some(to_https(url)),
    }
}

/// Host of a secure-shell remote, used to pick the host to trust.
pub fn ssh_host(url: &str) -> Option<&str> {
    parse_ssh(url).map(|(host, _)| host)
}

/// Split `https://<host>/<path>.git` into host and path (without suffix).
fn parse_https(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("https://")?;
    let rest = rest.strip_suffix(".git")?;
    let (host, path) = rest.split_once('/')?;
    if !valid_host(host) || !valid_path(path) {
        return None;
    }
    Some((host, path))
}

/// Split `<user>@<host>:<path>.git` into host and path (without suffix).
fn parse_ssh(url: &str) -> Option<(&str, &str)> {
    let (user, rest) = url.split_once('@')?;
    if user.is_empty() || user.contains(&['/', ':'][..]) {
        return None;
    }
    let rest = rest.strip_suffix(".git")?;
    let (host, path) = rest.split_once(':')?;
    if !valid_host(host) || !valid_path(path) {
        return None;
    }
    Some((host, path))
}

fn valid_host(host: &str) -> bool {
    !host.is_empty() && !host.contains(&['/', ':', '@'][..]) && !host.contains(char::is_whitespace)
}

fn valid_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.ends_with('/')
        && !path.contains("//")
        && !path.contains(char::is_whitespace)
        && !path.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_to_ssh() {
        assert_eq!(
            to_ssh("https://gitlab.com/group/sub/proj.git"),
            "git@gitlab.com:group/sub/proj.git"
        );
    }

    #[test]
    fn ssh_to_https_any_user() {
        assert_eq!(
            to_https("deploy@git.example.org:team/app.git"),
            "https://git.example.org/team/app.git"
        );
    }

    #[test]
    fn non_canonical_input_is_unchanged() {
        for url in [
            "",
            "https://github.com/",
            "https://github.com/.git",
            "http://github.com/a/b.git",
            "ssh://git@github.com/a/b.git",
            "git@github.com:a/b",
            "/srv/repos/project.git",
        ] {
            assert_eq!(to_ssh(url), url);
            assert_eq!(to_https(url), url);
        }
    }

    #[test]
    fn protocol_detection() {
        assert_eq!(protocol("https://github.com/a/b.git"), RemoteProtocol::Https);
        assert_eq!(protocol("git@github.com:a/b.git"), RemoteProtocol::Ssh);
        assert_eq!(protocol("file:///tmp/x"), RemoteProtocol::Unknown);
        assert_eq!(RemoteProtocol::Https.to_string(), "HTTPS");
    }

    #[test]
    fn convert_to_target() {
        let https = "https://github.com/a/b.git";
        let ssh = "git@github.com:a/b.git";
        assert_eq!(convert(https, RemoteProtocol::Ssh).as_deref(), Some(ssh));
        assert_eq!(convert(ssh, RemoteProtocol::Https).as_deref(), Some(https));
        assert_eq!(convert(ssh, RemoteProtocol::Ssh).as_deref(), Some(ssh));
        assert_eq!(convert("file:///tmp/x", RemoteProtocol::Ssh), None);
        assert_eq!(convert(https, RemoteProtocol::Unknown), None);
    }

    #[test]
    fn host_of_ssh_remote() {
        assert_eq!(ssh_host("git@github.com:a/b.git"), Some("github.com"));
        assert_eq!(ssh_host("https://github.com/a/b.git"), None);
    }
}
