//! Deployment pipeline tests against an in-memory remote.
//!
//! The source repository is faked: it writes a small text file (or creates a
//! directory) for every exported path, so the tests need neither svn nor an
//! FTP server.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use svn_ftp_sync::change::{change_set_from_log, ChangeKind, ChangeSet, PathChange, RepoPath, Revision};
use svn_ftp_sync::remote::{MemoryStore, RemoteOp, RemoteStore};
use svn_ftp_sync::scm::{RevisionSpec, SourceRepository};
use svn_ftp_sync::sync::{ConfirmationGate, RunOutcome, RunState, SyncDriver, SyncOptions};
use svn_ftp_sync::{SyncError, VerbosityLevel};
use tempfile::TempDir;

/// Source repository that writes `"<path>@<rev>"` for every exported file
#[derive(Default)]
struct FakeSource {
    directories: BTreeSet<String>,
    broken: BTreeSet<String>,
}

impl FakeSource {
    fn with_directory(mut self, path: &str) -> Self {
        self.directories.insert(path.to_string());
        self
    }

    fn with_broken(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }
}

impl SourceRepository for FakeSource {
    fn fetch_log(&self, _revisions: &RevisionSpec) -> Result<String, SyncError> {
        Ok(String::new())
    }

    fn materialize(&self, path: &RepoPath, revision: Revision, destination: &Path) -> Result<(), SyncError> {
        if self.broken.contains(path.as_str()) {
            return Err(SyncError::Materialization {
                path: path.clone(),
                revision,
                reason: "path not found".to_string(),
            });
        }

        let target = path.to_local(destination);
        if self.directories.contains(path.as_str()) {
            fs::create_dir_all(&target)?;
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, format!("{}@{}", path, revision))?;
        Ok(())
    }
}

/// Wraps a memory store and refuses to delete one file
struct StubbornStore {
    inner: MemoryStore,
    undeletable: String,
    delete_attempts: Vec<String>,
}

impl RemoteStore for StubbornStore {
    fn current_dir(&mut self) -> Result<String, SyncError> {
        self.inner.current_dir()
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.inner.change_dir(path)
    }

    fn make_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.inner.make_dir(path)
    }

    fn remove_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.inner.remove_dir(path)
    }

    fn put_file(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64, SyncError> {
        self.inner.put_file(name, reader)
    }

    fn remove_file(&mut self, name: &str) -> Result<(), SyncError> {
        let cwd = self.inner.current_dir()?;
        let full = format!("{}/{}", cwd.trim_end_matches('/'), name);
        self.delete_attempts.push(full.clone());

        if full == self.undeletable {
            return Err(SyncError::RemoteWrite {
                operation: "deleting file",
                path: full,
                reason: "550 Permission denied".to_string(),
            });
        }
        self.inner.remove_file(name)
    }
}

struct Answer(bool);

impl ConfirmationGate for Answer {
    fn confirm(&mut self, _question: &str) -> Result<bool, SyncError> {
        Ok(self.0)
    }
}

fn options(force: bool) -> SyncOptions {
    SyncOptions {
        project: "Test Site".to_string(),
        revisions: "10-12".to_string(),
        remote_base: "/htdocs".to_string(),
        force,
        verbosity: VerbosityLevel::Quiet,
    }
}

fn change(path: &str, revision: Revision, kind: ChangeKind) -> PathChange {
    PathChange::new(RepoPath::new(path).unwrap(), revision, kind)
}

fn summary_of(outcome: RunOutcome) -> svn_ftp_sync::sync::RunSummary {
    match outcome {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Aborted => panic!("expected the run to complete"),
    }
}

#[test]
fn test_full_run_publishes_in_listing_order() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default().with_directory("img");
    let mut driver = SyncDriver::new(&source, options(false), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([
        change("index.php", 11, ChangeKind::Modified),
        change("img", 10, ChangeKind::Added),
        change("img/Logo.png", 10, ChangeKind::Added),
        change("css/site.css", 12, ChangeKind::Added),
    ]);

    let mut store = MemoryStore::new();
    let remote = &mut store;
    let outcome = driver
        .run(&changes, &mut Answer(true), move || Ok(remote))
        .unwrap();
    let summary = summary_of(outcome);

    assert_eq!(driver.state(), RunState::Done);
    assert_eq!(summary.uploaded_files, 3);
    assert_eq!(summary.directories, 1);
    assert_eq!(summary.deleted, 0);

    assert_eq!(store.file("/htdocs/css/site.css").unwrap(), b"css/site.css@12");
    assert_eq!(store.file("/htdocs/img/Logo.png").unwrap(), b"img/Logo.png@10");
    assert_eq!(store.file("/htdocs/index.php").unwrap(), b"index.php@11");

    let puts: Vec<&str> = store
        .operations()
        .iter()
        .filter_map(|op| match op {
            RemoteOp::Put { path, .. } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        puts,
        vec!["/htdocs/css/site.css", "/htdocs/img/Logo.png", "/htdocs/index.php"]
    );

    // Each directory is created once, even though several paths need it
    let mkdirs = store
        .operations()
        .iter()
        .filter(|op| matches!(op, RemoteOp::MakeDir(_)))
        .count();
    assert_eq!(mkdirs, 3);
}

#[test]
fn test_existing_remote_files_are_overwritten() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([change("index.php", 12, ChangeKind::Modified)]);

    let mut store = MemoryStore::new().with_file("/htdocs/index.php", b"old content");
    let remote = &mut store;
    driver
        .run(&changes, &mut Answer(false), move || Ok(remote))
        .unwrap();

    assert_eq!(store.file("/htdocs/index.php").unwrap(), b"index.php@12");
    assert!(!store
        .operations()
        .iter()
        .any(|op| matches!(op, RemoteOp::MakeDir(_))));
}

#[test]
fn test_failed_deletion_does_not_stop_the_run() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([
        change("a.txt", 12, ChangeKind::Deleted),
        change("b.txt", 12, ChangeKind::Deleted),
        change("c.txt", 12, ChangeKind::Deleted),
    ]);

    let mut store = StubbornStore {
        inner: MemoryStore::new()
            .with_file("/htdocs/a.txt", b"a")
            .with_file("/htdocs/b.txt", b"b")
            .with_file("/htdocs/c.txt", b"c"),
        undeletable: "/htdocs/b.txt".to_string(),
        delete_attempts: Vec::new(),
    };
    let remote = &mut store;

    let outcome = driver
        .run(&changes, &mut Answer(true), move || Ok(remote))
        .unwrap();
    let summary = summary_of(outcome);

    assert_eq!(driver.state(), RunState::Done);
    assert_eq!(
        store.delete_attempts,
        vec!["/htdocs/a.txt", "/htdocs/b.txt", "/htdocs/c.txt"]
    );
    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.delete_failures.len(), 1);
    assert_eq!(summary.delete_failures[0].path.as_str(), "b.txt");
    assert!(summary.delete_failures[0].reason.contains("Permission denied"));

    assert!(store.inner.file("/htdocs/a.txt").is_none());
    assert!(store.inner.file("/htdocs/b.txt").is_some());
    assert!(store.inner.file("/htdocs/c.txt").is_none());
}

#[test]
fn test_deleted_directory_is_removed_as_directory() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([change("old", 12, ChangeKind::Deleted)]);

    let mut store = MemoryStore::new().with_dir("/htdocs/old");
    let remote = &mut store;
    let summary = summary_of(
        driver
            .run(&changes, &mut Answer(true), move || Ok(remote))
            .unwrap(),
    );

    assert_eq!(summary.deleted, 1);
    assert!(!store.has_dir("/htdocs/old"));
    assert_eq!(
        store.operations(),
        &[RemoteOp::RemoveDir("/htdocs/old".to_string())]
    );
}

#[test]
fn test_empty_change_set_touches_nothing() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(false), staging.path().to_path_buf());

    // A revision with no path entries, e.g. a property-only commit
    let changes = change_set_from_log("r12 | dev | 2024-01-01 | 1 line\n", None).unwrap();
    assert!(changes.is_empty());

    let mut connected = false;
    let outcome = driver
        .run(&changes, &mut Answer(false), || {
            connected = true;
            Ok(MemoryStore::new())
        })
        .unwrap();

    let summary = summary_of(outcome);
    assert_eq!(driver.state(), RunState::Done);
    assert!(!connected);
    assert_eq!(summary.uploaded_files, 0);
    assert!(summary.staging_dir.is_none());
    assert!(driver.journal().is_empty());
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn test_declining_aborts_without_side_effects() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(false), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([
        change("index.php", 11, ChangeKind::Added),
        change("old.php", 11, ChangeKind::Deleted),
    ]);

    let mut connected = false;
    let outcome = driver
        .run(&changes, &mut Answer(false), || {
            connected = true;
            Ok(MemoryStore::new())
        })
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Aborted));
    assert_eq!(driver.state(), RunState::Aborted);
    assert!(!connected);
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn test_materialization_failure_never_reaches_the_remote() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default().with_broken("b.php");
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([
        change("a.php", 11, ChangeKind::Added),
        change("b.php", 11, ChangeKind::Added),
        change("old.php", 11, ChangeKind::Deleted),
    ]);

    let mut connected = false;
    let err = driver
        .run(&changes, &mut Answer(true), || {
            connected = true;
            Ok(MemoryStore::new())
        })
        .unwrap_err();

    assert!(matches!(err, SyncError::Materialization { revision: 11, .. }));
    assert!(err.to_string().contains("b.php"));
    assert_eq!(driver.state(), RunState::Failed);
    assert!(!connected);
}

#[test]
fn test_publication_failure_is_fatal_and_skips_deletion() {
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let changes = ChangeSet::from_changes([
        change("a.php", 11, ChangeKind::Added),
        change("conf/db.php", 11, ChangeKind::Added),
        change("old.php", 11, ChangeKind::Deleted),
    ]);

    // A plain file sits where the conf directory should go
    let mut store = MemoryStore::new()
        .with_file("/htdocs/conf", b"not a directory")
        .with_file("/htdocs/old.php", b"old");
    let remote = &mut store;

    let err = driver
        .run(&changes, &mut Answer(true), move || Ok(remote))
        .unwrap_err();

    assert!(err.is_remote());
    assert_eq!(driver.state(), RunState::Failed);

    // Published paths stay, deletion never ran
    assert_eq!(store.file("/htdocs/a.php").unwrap(), b"a.php@11");
    assert!(store.file("/htdocs/old.php").is_some());
    assert_eq!(driver.journal().len(), 1);
}

#[test]
fn test_collapsed_log_deploys_only_the_net_effect() {
    let log = "\
------------------------------------------------------------------------
r10 | dev | 2024-03-01 10:00:00 +0100 | 1 line
Changed paths:
   A /tmp.txt
   A /index.php

start
------------------------------------------------------------------------
r11 | dev | 2024-03-02 10:00:00 +0100 | 1 line
Changed paths:
   D /tmp.txt
   M /index.php
   M /about.php

edit
------------------------------------------------------------------------
";

    let changes = change_set_from_log(log, None).unwrap();
    let staging = TempDir::new().unwrap();
    let source = FakeSource::default();
    let mut driver = SyncDriver::new(&source, options(true), staging.path().to_path_buf());

    let mut store = MemoryStore::new().with_file("/htdocs/about.php", b"v1");
    let remote = &mut store;
    let summary = summary_of(
        driver
            .run(&changes, &mut Answer(true), move || Ok(remote))
            .unwrap(),
    );

    assert_eq!(summary.uploaded_files, 2);
    assert_eq!(summary.deleted, 0);
    assert!(store.file("/htdocs/tmp.txt").is_none());
    assert_eq!(store.file("/htdocs/index.php").unwrap(), b"index.php@10");
    assert_eq!(store.file("/htdocs/about.php").unwrap(), b"about.php@11");
    assert!(!store
        .operations()
        .iter()
        .any(|op| matches!(op, RemoteOp::RemoveFile(_))));
}
