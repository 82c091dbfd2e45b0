//! # svn-ftp-sync
//!
//! A command-line tool for deploying a range of Subversion revisions to an FTP server.
//!
//! ## Overview
//!
//! `svn-ftp-sync` reads the verbose log of the requested revisions, collapses every
//! add/modify/delete into the minimal set of per-path changes, shows that set for review,
//! and then mirrors it to the remote target: changed paths are exported into a fresh local
//! staging directory and uploaded, deleted paths are removed from the server.
//!
//! ## Key Features
//!
//! - **Change collapsing**: A file added and later deleted in the range is never touched
//! - **Review before deploy**: Added, modified and deleted paths are listed and confirmed
//! - **Binary-safe uploads**: Missing remote directories are created on the way
//! - **Best-effort deletion**: A failing delete is reported and the run carries on
//! - **Dry run**: Publish into an in-memory tree and print what would have been sent
//! - **Cross-platform**: Platform-specific config directories on Linux, macOS and Windows
//!
//! ## Architecture
//!
//! - Change-set derivation ([`change`])
//! - Source repository access ([`scm`]) and remote stores ([`remote`])
//! - The deployment pipeline ([`sync`]) and its review report ([`report`])
//! - Configuration and logging ([`settings`], [`config`], [`logger`], [`error`])
//! - Command handlers ([`handlers`])

/// Revision-log parsing and change-set aggregation.
///
/// Turns `svn log --verbose` output into path change events and folds them into a
/// change set where each path carries exactly one pending action.
pub mod change;

/// Platform-agnostic configuration directory management.
///
/// Locates the config file, the log file and the staging root following platform
/// conventions (XDG on Linux, Application Support on macOS, AppData on Windows).
pub mod config;

/// Error taxonomy of the deployment core.
pub mod error;

/// Command handler functions, one per subcommand.
pub mod handlers;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG`) and a persistent log file in the
/// config directory, with rotation when the file grows too large.
pub mod logger;

/// Remote file stores: the `RemoteStore` trait, the FTP backend and an in-memory tree.
pub mod remote;

/// Change-set review report in console, JSON and Markdown form.
pub mod report;

/// Source repository access.
///
/// Defines revision specifications and the `SourceRepository` trait, implemented for the
/// Subversion command-line client.
pub mod scm;

/// Per-project deployment configuration loaded from TOML.
pub mod settings;

/// The deployment pipeline.
///
/// Review, confirmation, export to staging, upload and deletion, driven as a small state
/// machine. Also owns staging directory creation and cleanup.
pub mod sync;

pub use error::SyncError;

/// How much progress output goes to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbosityLevel {
    /// Errors and the final result only
    Quiet,
    #[default]
    Normal,
    /// Extra detail such as staging paths and byte counts
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
