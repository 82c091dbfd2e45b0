//! Deployment pipeline.
//!
//! Review, confirmation, materialization, publication and deletion run
//! strictly one after another, one path at a time, in listing order.

mod gate;
mod materialize;
mod publish;
pub mod staging;

pub use gate::{is_interactive, ConfirmationGate, PromptGate, Unattended};
pub use staging::{cleanup_staging, find_stale_staging, StagingArea, StaleStaging};

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

use crate::change::{ChangeSet, RepoPath};
use crate::error::SyncError;
use crate::remote::RemoteStore;
use crate::report::ChangeReport;
use crate::scm::SourceRepository;
use crate::VerbosityLevel;

const CONFIRM_QUESTION: &str = "Continue with uploading/deleting the above path(s)?";

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Reviewing,
    Confirmed,
    Materializing,
    Publishing,
    Deleting,
    Done,
    Aborted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Pending => "pending",
            RunState::Reviewing => "reviewing",
            RunState::Confirmed => "confirmed",
            RunState::Materializing => "materializing",
            RunState::Publishing => "publishing",
            RunState::Deleting => "deleting",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A deletion that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub path: RepoPath,
    pub reason: String,
}

/// What a completed run did
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub uploaded_files: usize,
    pub uploaded_bytes: u64,
    pub directories: usize,
    pub deleted: usize,
    pub delete_failures: Vec<DeleteFailure>,
    /// Local directory holding the exported paths, if one was created
    pub staging_dir: Option<PathBuf>,
}

impl RunSummary {
    pub fn print(&self) {
        println!();
        println!("{}", "Summary".bold());
        println!("  {} {}", "Files uploaded:".dimmed(), self.uploaded_files);
        println!("  {} {}", "Bytes uploaded:".dimmed(), self.uploaded_bytes);
        println!("  {} {}", "Directories:".dimmed(), self.directories);
        println!("  {} {}", "Deleted:".dimmed(), self.deleted);

        if !self.delete_failures.is_empty() {
            println!(
                "  {} {}",
                "Skipped deletions:".yellow(),
                self.delete_failures.len()
            );
            for failure in &self.delete_failures {
                println!("     {}: {}", failure.path, failure.reason);
            }
        }

        if let Some(dir) = &self.staging_dir {
            println!("  {} {}", "Staging:".dimmed(), dir.display());
        }
    }
}

/// How a run ended when it did not fail
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The operator declined; nothing was touched
    Aborted,
}

/// Per-run settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub project: String,
    /// Revisions as requested, shown in the review
    pub revisions: String,
    /// Remote directory the repository paths are published below
    pub remote_base: String,
    /// Skip the confirmation gate
    pub force: bool,
    pub verbosity: VerbosityLevel,
}

/// Drives one deployment from review to completion
pub struct SyncDriver<'a> {
    source: &'a dyn SourceRepository,
    options: SyncOptions,
    staging_root: PathBuf,
    state: RunState,
    journal: Vec<String>,
}

impl<'a> SyncDriver<'a> {
    pub fn new(source: &'a dyn SourceRepository, options: SyncOptions, staging_root: PathBuf) -> Self {
        SyncDriver {
            source,
            options,
            staging_root,
            state: RunState::Pending,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// One line per remote action taken, in order
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: SyncError) -> SyncError {
        log::error!("Deployment failed while {}: {}", self.state, error);
        self.transition(RunState::Failed);
        error
    }

    /// Run the whole pipeline for `changes`.
    ///
    /// `connect` is only called once every upload path has been exported, so
    /// a materialization failure never opens a remote session. Returns an
    /// error (and ends in [`RunState::Failed`]) when materialization or
    /// publication fails. Deletion failures end up in the summary.
    pub fn run<R, C>(
        &mut self,
        changes: &ChangeSet,
        gate: &mut dyn ConfirmationGate,
        connect: C,
    ) -> Result<RunOutcome, SyncError>
    where
        R: RemoteStore,
        C: FnOnce() -> Result<R, SyncError>,
    {
        let verbosity = self.options.verbosity;
        self.transition(RunState::Reviewing);

        if verbosity != VerbosityLevel::Quiet {
            ChangeReport::from_change_set(&self.options.project, &self.options.revisions, changes)
                .print_console();
        }

        let mut summary = RunSummary::default();
        if changes.is_empty() {
            if verbosity != VerbosityLevel::Quiet {
                println!();
                println!("{}", "Nothing to deploy.".yellow());
            }
            self.transition(RunState::Done);
            return Ok(RunOutcome::Completed(summary));
        }

        if !self.options.force {
            if verbosity != VerbosityLevel::Quiet {
                println!();
            }
            let confirmed = match gate.confirm(CONFIRM_QUESTION) {
                Ok(answer) => answer,
                Err(e) => return Err(self.fail(e)),
            };
            if !confirmed {
                log::info!("Deployment declined by operator");
                self.transition(RunState::Aborted);
                return Ok(RunOutcome::Aborted);
            }
        }
        self.transition(RunState::Confirmed);

        let uploads = changes.upload_set();
        let deletions = changes.deleted_paths();

        self.transition(RunState::Materializing);
        let staging = match StagingArea::create(&self.staging_root, &self.options.project) {
            Ok(staging) => staging,
            Err(e) => return Err(self.fail(e)),
        };
        summary.staging_dir = Some(staging.path().to_path_buf());

        if let Err(e) =
            materialize::materialize_all(self.source, &uploads, staging.path(), verbosity)
        {
            return Err(self.fail(e));
        }

        self.transition(RunState::Publishing);
        let mut remote = match connect() {
            Ok(remote) => remote,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = publish::publish_all(
            &mut remote,
            &uploads,
            staging.path(),
            &self.options.remote_base,
            &mut summary,
            &mut self.journal,
            verbosity,
        ) {
            return Err(self.fail(e));
        }

        self.transition(RunState::Deleting);
        publish::delete_all(
            &mut remote,
            &deletions,
            &self.options.remote_base,
            &mut summary,
            &mut self.journal,
            verbosity,
        );

        self.transition(RunState::Done);
        log::info!(
            "Deployment finished: {} file(s), {} directorie(s), {} deletion(s), {} skipped",
            summary.uploaded_files,
            summary.directories,
            summary.deleted,
            summary.delete_failures.len()
        );

        Ok(RunOutcome::Completed(summary))
    }
}
