//! Change-set derivation.
//!
//! Turns a verbose revision log into the minimal set of per-path changes
//! that must be mirrored to the remote target.

mod parser;
mod set;
mod types;

pub use parser::parse_log;
pub use set::ChangeSet;
pub use types::{supersede, ChangeKind, PathChange, RepoPath, Revision};

use crate::error::SyncError;

/// Parse a log and fold it into a change set.
///
/// When `source_root` is given, only paths below it are kept and they are
/// re-rooted relative to it.
pub fn change_set_from_log(log: &str, source_root: Option<&RepoPath>) -> Result<ChangeSet, SyncError> {
    let changes = parse_log(log)?;
    let total = changes.len();

    let set = match source_root {
        Some(root) => changes.iter().filter_map(|c| c.rebased(root)).collect(),
        None => ChangeSet::from_changes(changes),
    };

    log::info!(
        "Collapsed {} logged change(s) into {} path(s)",
        total,
        set.len()
    );
    Ok(set)
}
