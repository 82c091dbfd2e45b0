//! Source repository abstraction.
//!
//! The deployment core only needs two things from version control: the raw
//! verbose log for a set of revisions, and a way to export one path at one
//! revision into local storage.

mod svn;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::change::{RepoPath, Revision};
use crate::error::SyncError;

pub use svn::SvnClient;

/// Revisions whose log should be deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionSpec {
    /// The youngest revision in the repository
    Head,
    Single(Revision),
    /// Individual revisions, ascending and without duplicates
    List(Vec<Revision>),
    /// Inclusive range, `from <= to`
    Range(Revision, Revision),
}

impl Default for RevisionSpec {
    fn default() -> Self {
        RevisionSpec::Head
    }
}

impl RevisionSpec {
    /// Arguments selecting these revisions on the `svn log` command line.
    ///
    /// Always oldest-first, so later log entries describe newer changes.
    pub fn svn_args(&self) -> Vec<String> {
        match self {
            RevisionSpec::Head => vec!["-r".to_string(), "HEAD".to_string()],
            RevisionSpec::Single(rev) => vec!["-r".to_string(), rev.to_string()],
            RevisionSpec::List(revs) => revs
                .iter()
                .flat_map(|rev| ["-r".to_string(), rev.to_string()])
                .collect(),
            RevisionSpec::Range(from, to) => vec!["-r".to_string(), format!("{from}:{to}")],
        }
    }
}

impl FromStr for RevisionSpec {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| {
            SyncError::Configuration(format!(
                "Invalid revision '{s}': {reason}. Use HEAD, 193, 193-204 or 192,194,195"
            ))
        };
        let number = |part: &str| -> Result<Revision, SyncError> {
            let part = part.trim();
            let part = part.strip_prefix(['r', 'R']).unwrap_or(part);
            part.parse::<Revision>().map_err(|e| invalid(e.to_string()))
        };

        if s.is_empty() || s.eq_ignore_ascii_case("HEAD") {
            return Ok(RevisionSpec::Head);
        }

        if s.contains(',') {
            let mut revs = s.split(',').map(number).collect::<Result<Vec<_>, _>>()?;
            revs.sort_unstable();
            revs.dedup();
            return Ok(match revs.as_slice() {
                [single] => RevisionSpec::Single(*single),
                _ => RevisionSpec::List(revs),
            });
        }

        if let Some((from, to)) = s.split_once(['-', ':']) {
            let (from, to) = (number(from)?, number(to)?);
            return Ok(match from.cmp(&to) {
                std::cmp::Ordering::Equal => RevisionSpec::Single(from),
                std::cmp::Ordering::Less => RevisionSpec::Range(from, to),
                std::cmp::Ordering::Greater => RevisionSpec::Range(to, from),
            });
        }

        Ok(RevisionSpec::Single(number(s)?))
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionSpec::Head => write!(f, "HEAD"),
            RevisionSpec::Single(rev) => write!(f, "{rev}"),
            RevisionSpec::List(revs) => {
                let joined: Vec<String> = revs.iter().map(|r| r.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
            RevisionSpec::Range(from, to) => write!(f, "{from}-{to}"),
        }
    }
}

/// Operations the deployment core requires from version control
pub trait SourceRepository {
    /// Raw verbose log for the given revisions
    fn fetch_log(&self, revisions: &RevisionSpec) -> Result<String, SyncError>;

    /// Export `path` as of `revision` to `destination/<path>`.
    ///
    /// Directories are exported with their immediate files only.
    fn materialize(
        &self,
        path: &RepoPath,
        revision: Revision,
        destination: &Path,
    ) -> Result<(), SyncError>;
}
