use std::collections::BTreeMap;

use super::types::{supersede, ChangeKind, PathChange, RepoPath};

/// Net change per path across a revision window.
///
/// Events must be applied in log order; the order decides which
/// add/modify/delete combination is observed.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    entries: BTreeMap<RepoPath, PathChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an ordered sequence of events
    pub fn from_changes<I>(changes: I) -> Self
    where
        I: IntoIterator<Item = PathChange>,
    {
        let mut set = Self::new();
        for change in changes {
            set.apply(change);
        }
        set
    }

    /// Record one event, resolving it against any entry for the same path
    pub fn apply(&mut self, change: PathChange) {
        let Some(existing) = self.entries.get(change.path()) else {
            self.entries.insert(change.path().clone(), change);
            return;
        };

        match supersede(existing.kind(), change.kind()) {
            None => {
                log::debug!("{} was added and deleted in the same window", change.path());
                self.entries.remove(change.path());
            }
            Some(kind) if kind == change.kind() => {
                self.entries.insert(change.path().clone(), change);
            }
            Some(_) => {}
        }
    }

    pub fn added_paths(&self) -> Vec<&PathChange> {
        self.of_kind(ChangeKind::Added)
    }

    pub fn modified_paths(&self) -> Vec<&PathChange> {
        self.of_kind(ChangeKind::Modified)
    }

    pub fn deleted_paths(&self) -> Vec<&PathChange> {
        self.of_kind(ChangeKind::Deleted)
    }

    /// Added and modified paths together, in listing order
    pub fn upload_set(&self) -> Vec<&PathChange> {
        let mut paths: Vec<_> = self
            .entries
            .values()
            .filter(|c| c.kind() != ChangeKind::Deleted)
            .collect();
        sort_for_listing(&mut paths);
        paths
    }

    pub fn get(&self, path: &RepoPath) -> Option<&PathChange> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn of_kind(&self, kind: ChangeKind) -> Vec<&PathChange> {
        let mut paths: Vec<_> = self.entries.values().filter(|c| c.kind() == kind).collect();
        sort_for_listing(&mut paths);
        paths
    }
}

impl FromIterator<PathChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = PathChange>>(iter: I) -> Self {
        Self::from_changes(iter)
    }
}

fn sort_for_listing(paths: &mut [&PathChange]) {
    paths.sort_by(|a, b| a.path().cmp_case_insensitive(b.path()));
}
