//! git::parse
//!
//! Parsers from engine output to the typed result schema.
//!
//! Each parser pairs with the exact argument list the dispatcher sends, so
//! the format strings live here too.

use crate::core::types::{
    BranchEntry, BranchSummary, FileStatus, LogEntry, LogResult, RemoteEntry, RenamedFile,
    StatusSummary,
};

/// Arguments for a status listing [`parse_status`] understands.
pub const STATUS_ARGS: &[&str] = &["status", "--porcelain=v1", "--branch"];

const FIELD: char = '\x1f';
const RECORD: char = '\x1e';

/// `--pretty` format for [`parse_log`]: fields split by US, records by RS.
pub const LOG_FORMAT: &str = "--pretty=format:%H%x1f%aI%x1f%s%x1f%D%x1f%b%x1f%an%x1f%ae%x1e";

/// `--format` for [`parse_branches`]: NUL-separated fields.
pub const BRANCH_FORMAT: &str =
    "--format=%(HEAD)%00%(refname:short)%00%(objectname)%00%(contents:subject)";

/// Parse `git status --porcelain=v1 --branch`.
pub fn parse_status(output: &str) -> StatusSummary {
    let mut status = StatusSummary::default();

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            parse_branch_header(header, &mut status);
            continue;
        }
        if line.len() < 4 {
            continue;
        }

        let mut codes = line.chars();
        let (x, y) = match (codes.next(), codes.next()) {
            (Some(x), Some(y)) => (x, y),
            _ => continue,
        };
        if x == '!' && y == '!' {
            continue;
        }
        let Some(raw) = line.get(3..) else {
            continue;
        };

        let path = if matches!(x, 'R' | 'C') {
            match split_rename(raw) {
                Some((from, to)) => {
                    if x == 'R' {
                        status.renamed.push(RenamedFile {
                            from,
                            to: to.clone(),
                        });
                    }
                    to
                }
                None => unquote(raw),
            }
        } else {
            unquote(raw)
        };

        classify_entry(x, y, &path, &mut status);
        status.files.push(FileStatus {
            path,
            index: x.to_string(),
            working_dir: y.to_string(),
        });
    }

    status
}

fn classify_entry(x: char, y: char, path: &str, status: &mut StatusSummary) {
    if x == '?' && y == '?' {
        push_unique(&mut status.not_added, path);
        return;
    }
    if x == 'U' || y == 'U' || (x == 'A' && y == 'A') || (x == 'D' && y == 'D') {
        push_unique(&mut status.conflicted, path);
        return;
    }

    match x {
        'A' | 'C' => push_unique(&mut status.created, path),
        'M' | 'T' => push_unique(&mut status.modified, path),
        'D' => push_unique(&mut status.deleted, path),
        _ => {}
    }
    if matches!(x, 'A' | 'C' | 'M' | 'T' | 'D' | 'R') {
        push_unique(&mut status.staged, path);
    }

    match y {
        'M' | 'T' => push_unique(&mut status.modified, path),
        'D' => push_unique(&mut status.deleted, path),
        'A' => push_unique(&mut status.created, path),
        _ => {}
    }
}

fn push_unique(list: &mut Vec<String>, path: &str) {
    if !list.iter().any(|p| p == path) {
        list.push(path.to_string());
    }
}

/// `main...origin/main [ahead 1, behind 2]`, `No commits yet on main`,
/// `HEAD (no branch)`.
fn parse_branch_header(header: &str, status: &mut StatusSummary) {
    for prefix in ["No commits yet on ", "Initial commit on "] {
        if let Some(branch) = header.strip_prefix(prefix) {
            status.current = Some(branch.trim().to_string());
            return;
        }
    }
    if header.starts_with("HEAD (no branch)") {
        return;
    }

    let (refs, counts) = match header.split_once(" [") {
        Some((refs, counts)) => (refs, Some(counts.trim_end_matches(']'))),
        None => (header, None),
    };

    match refs.split_once("...") {
        Some((local, upstream)) => {
            status.current = Some(local.to_string());
            status.tracking = Some(upstream.to_string());
        }
        None => status.current = Some(refs.trim().to_string()),
    }

    for part in counts.into_iter().flat_map(|c| c.split(", ")) {
        if let Some(n) = part.strip_prefix("ahead ") {
            status.ahead = n.trim().parse().unwrap_or(0);
        } else if let Some(n) = part.strip_prefix("behind ") {
            status.behind = n.trim().parse().unwrap_or(0);
        }
    }
}

/// Split `from -> to`, honouring quoted paths.
fn split_rename(raw: &str) -> Option<(String, String)> {
    if let Some(rest) = raw.strip_prefix('"') {
        let end = closing_quote(rest)?;
        let from = unquote(&raw[..end + 2]);
        let to = raw[end + 2..].strip_prefix(" -> ")?;
        return Some((from, unquote(to)));
    }
    let (from, to) = raw.split_once(" -> ")?;
    Some((from.to_string(), unquote(to)))
}

/// Byte index of the unescaped closing quote in `s` (which follows an
/// opening quote).
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

/// Undo git's C-style path quoting (`"a\tb"`, `"caf\303\251"`).
fn unquote(raw: &str) -> String {
    let inner = match raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return raw.to_string(),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse log output produced with [`LOG_FORMAT`].
pub fn parse_log(output: &str) -> LogResult {
    let entries = output
        .split(RECORD)
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            let fields: Vec<&str> = record.split(FIELD).collect();
            let field = |i: usize| fields.get(i).copied().unwrap_or("").to_string();
            LogEntry {
                hash: field(0),
                date: field(1),
                message: field(2),
                refs: field(3),
                body: fields.get(4).copied().unwrap_or("").trim_end().to_string(),
                author_name: field(5),
                author_email: fields.get(6).copied().unwrap_or("").trim_end().to_string(),
            }
        })
        .collect();
    LogResult::from_entries(entries)
}

/// Parse `git branch` output produced with [`BRANCH_FORMAT`].
///
/// A detached HEAD shows up as a `(HEAD detached at …)` pseudo-entry; it
/// sets `detached` and is not listed as a branch.
pub fn parse_branches(output: &str) -> BranchSummary {
    let mut summary = BranchSummary::default();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let mut fields = line.split('\0');
        let head = fields.next().unwrap_or("");
        let name = fields.next().unwrap_or("").to_string();
        let commit = fields.next().unwrap_or("").to_string();
        let label = fields.next().unwrap_or("").to_string();
        let current = head.trim() == "*";

        if name.starts_with('(') {
            summary.detached = summary.detached || current;
            continue;
        }
        if current {
            summary.current = Some(name.clone());
        }
        summary.all.push(name.clone());
        summary.branches.insert(
            name.clone(),
            BranchEntry {
                current,
                name,
                commit,
                label,
            },
        );
    }

    summary
}

/// Parse `git remote -v`. Order follows first appearance.
pub fn parse_remotes(output: &str) -> Vec<RemoteEntry> {
    let mut remotes: Vec<RemoteEntry> = Vec::new();

    for line in output.lines() {
        let Some((name, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let rest = rest.trim();
        let (url, kind) = match rest.rsplit_once(' ') {
            Some((url, kind)) if kind.starts_with('(') => (url.trim(), kind),
            _ => (rest, "(fetch)"),
        };

        let index = match remotes.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                remotes.push(RemoteEntry {
                    name: name.to_string(),
                    fetch: String::new(),
                    push: String::new(),
                });
                remotes.len() - 1
            }
        };
        let entry = &mut remotes[index];
        if kind == "(push)" {
            entry.push = url.to_string();
        } else {
            entry.fetch = url.to_string();
        }
    }

    for remote in &mut remotes {
        if remote.push.is_empty() {
            remote.push = remote.fetch.clone();
        }
    }
    remotes
}

/// Split a newline-delimited tag listing, dropping blank lines.
pub fn parse_tags(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
