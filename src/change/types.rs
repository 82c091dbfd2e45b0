use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SyncError;

/// A repository revision number
pub type Revision = u64;

/// Repository path normalized to forward slashes with no leading slash.
///
/// This is the identity key of a change: two log lines naming the same
/// `RepoPath` describe the same item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoPath(String);

impl RepoPath {
    /// Normalize a raw path. Returns `None` for the repository root.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");

        if normalized.is_empty() {
            None
        } else {
            Some(RepoPath(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Re-root this path below `prefix`, e.g. `trunk/www/a.php` under
    /// `trunk` becomes `www/a.php`. The prefix itself is not below itself.
    pub fn strip_prefix(&self, prefix: &RepoPath) -> Option<RepoPath> {
        self.0
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(RepoPath::new)
    }

    /// Location of this path below a local directory
    pub fn to_local(&self, base: &Path) -> PathBuf {
        self.segments().fold(base.to_path_buf(), |acc, s| acc.join(s))
    }

    /// Location of this path below a remote base directory
    pub fn to_remote(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        format!("{}/{}", base, self.0)
    }

    /// Case-insensitive ordering used for every user-facing listing.
    /// Ties are broken on the raw string so the order stays total.
    pub fn cmp_case_insensitive(&self, other: &RepoPath) -> Ordering {
        let lhs = self.0.chars().flat_map(char::to_lowercase);
        let rhs = other.0.chars().flat_map(char::to_lowercase);
        lhs.cmp(rhs).then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RepoPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RepoPath::new(&value).ok_or_else(|| format!("'{value}' is not a repository path"))
    }
}

impl From<RepoPath> for String {
    fn from(path: RepoPath) -> Self {
        path.0
    }
}

/// Kind of change recorded for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl FromStr for ChangeKind {
    type Err = SyncError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "A" => Ok(ChangeKind::Added),
            "M" => Ok(ChangeKind::Modified),
            "D" => Ok(ChangeKind::Deleted),
            other => Err(SyncError::UnknownChangeKind(other.to_string())),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// One change to one path, as recorded at one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathChange {
    path: RepoPath,
    revision: Revision,
    kind: ChangeKind,
}

impl PathChange {
    pub fn new(path: RepoPath, revision: Revision, kind: ChangeKind) -> Self {
        PathChange {
            path,
            revision,
            kind,
        }
    }

    /// Build a change from a raw log marker such as `A` or `D`
    pub fn from_marker(path: RepoPath, revision: Revision, marker: &str) -> Result<Self, SyncError> {
        Ok(Self::new(path, revision, marker.parse()?))
    }

    pub fn path(&self) -> &RepoPath {
        &self.path
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// The same change with its path re-rooted below `prefix`
    pub fn rebased(&self, prefix: &RepoPath) -> Option<PathChange> {
        self.path
            .strip_prefix(prefix)
            .map(|path| PathChange::new(path, self.revision, self.kind))
    }
}

impl fmt::Display for PathChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  (r{})", self.path, self.revision)
    }
}

/// Resolve a new change against the one already recorded for a path.
///
/// Returns the kind the path ends up with, or `None` when the entry must be
/// dropped. When the result differs from `incoming`, the existing entry is
/// kept as it is.
pub fn supersede(existing: ChangeKind, incoming: ChangeKind) -> Option<ChangeKind> {
    match (existing, incoming) {
        (ChangeKind::Added, ChangeKind::Deleted) => None,
        (ChangeKind::Added, ChangeKind::Modified) => Some(ChangeKind::Added),
        (_, incoming) => Some(incoming),
    }
}
