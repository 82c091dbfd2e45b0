//! Verbose revision log parsing.
//!
//! The log is expected in the shape produced by `svn log --verbose`:
//!
//! ```text
//! ------------------------------------------------------------------------
//! r193 | alice | 2024-03-01 10:12:44 +0100 (Fri, 01 Mar 2024) | 1 line
//! Changed paths:
//!    A /trunk/www/new.php
//!    M /trunk/www/index.php
//!    D /trunk/www/old.php
//!    A /trunk/www/copy.php (from /trunk/www/orig.php:190)
//! ```

use crate::error::SyncError;

use super::types::{PathChange, RepoPath, Revision};

/// Width of the status column in front of each changed path (`   A `)
const STATUS_PREFIX_WIDTH: usize = 5;

/// Parse a verbose log into change events, in the order they appear.
///
/// Revision header lines move the current revision cursor. Status lines
/// produce one event each. Everything else is skipped.
pub fn parse_log(log: &str) -> Result<Vec<PathChange>, SyncError> {
    let mut changes = Vec::new();
    let mut revision: Option<Revision> = None;

    for (idx, raw_line) in log.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        let line_no = idx + 1;

        if let Some(digits) = revision_header(line) {
            let parsed = digits.parse::<Revision>().map_err(|e| SyncError::Parsing {
                line: line_no,
                reason: format!("invalid revision 'r{digits}': {e}"),
            })?;
            revision = Some(parsed);
            continue;
        }

        let Some((marker, path)) = status_line(line) else {
            continue;
        };

        let Some(current) = revision else {
            log::warn!(
                "Ignoring changed path on line {} before any revision header: {}",
                line_no,
                line.trim()
            );
            continue;
        };

        let Some(path) = RepoPath::new(strip_annotation(path)) else {
            log::debug!("Ignoring change to the repository root on line {}", line_no);
            continue;
        };

        changes.push(PathChange::from_marker(path, current, marker)?);
    }

    Ok(changes)
}

/// Digits of a `r<digits>` header, which is either the whole line or
/// followed by a space (`r193 | alice | ...`).
fn revision_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('r')?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    if end == 0 {
        return None;
    }

    match rest[end..].chars().next() {
        None | Some(' ') => Some(&rest[..end]),
        Some(_) => None,
    }
}

/// Split `   A /path` into its marker and path fragment
fn status_line(line: &str) -> Option<(&str, &str)> {
    if line.len() <= STATUS_PREFIX_WIDTH || !line.is_char_boundary(STATUS_PREFIX_WIDTH) {
        return None;
    }

    let (prefix, path) = line.split_at(STATUS_PREFIX_WIDTH);
    let marker = match prefix {
        "   A " => "A",
        "   M " => "M",
        "   D " => "D",
        other => {
            if other.starts_with("   R ") {
                log::warn!("Replaced path is not deployed: {}", path);
            }
            return None;
        }
    };

    Some((marker, path))
}

/// Drop a trailing `(from /x:12)` style annotation
fn strip_annotation(path: &str) -> &str {
    let trimmed = path.trim_end();
    let Some(pos) = trimmed.rfind(" (from ") else {
        return trimmed;
    };
    let copied = trimmed[pos + " (from ".len()..].strip_suffix(')');
    let is_copy_source = copied
        .and_then(|source| source.rsplit_once(':'))
        .is_some_and(|(from, rev)| {
            !from.is_empty() && !rev.is_empty() && rev.bytes().all(|b| b.is_ascii_digit())
        });

    if is_copy_source {
        &trimmed[..pos]
    } else {
        trimmed
    }
}
