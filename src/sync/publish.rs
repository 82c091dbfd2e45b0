use colored::Colorize;
use std::fs;
use std::path::Path;

use super::{DeleteFailure, RunSummary};
use crate::change::PathChange;
use crate::error::SyncError;
use crate::remote::{split_remote, RemoteStore};
use crate::VerbosityLevel;

/// Create or upload every staged path on the remote, in listing order.
///
/// Any failure is fatal. Paths published before the failure stay on the
/// remote.
pub(super) fn publish_all(
    remote: &mut dyn RemoteStore,
    uploads: &[&PathChange],
    staging: &Path,
    remote_base: &str,
    summary: &mut RunSummary,
    journal: &mut Vec<String>,
    verbosity: VerbosityLevel,
) -> Result<(), SyncError> {
    if verbosity != VerbosityLevel::Quiet {
        println!();
        println!("{}", "Uploading added/modified path(s).".bold());
    }

    for change in uploads {
        if verbosity != VerbosityLevel::Quiet {
            println!("   {} ...", change.path());
        }

        let local = change.path().to_local(staging);
        let remote_path = change.path().to_remote(remote_base);
        let metadata =
            fs::metadata(&local).map_err(|_| SyncError::MissingStagedItem(local.clone()))?;

        if metadata.is_dir() {
            remote.create_directory(&remote_path)?;
            summary.directories += 1;
            journal.push(format!("created {} (r{})", remote_path, change.revision()));
        } else {
            let (parent, _) = split_remote(&remote_path);
            remote.create_directory(parent)?;
            let bytes = remote.upload_file(&local, &remote_path)?;
            summary.uploaded_files += 1;
            summary.uploaded_bytes += bytes;
            journal.push(format!(
                "uploaded {} (r{}, {} bytes)",
                remote_path,
                change.revision(),
                bytes
            ));

            if verbosity == VerbosityLevel::Verbose {
                println!("     {} {} bytes", "→".dimmed(), bytes);
            }
        }
    }

    Ok(())
}

/// Remove every deleted path from the remote, best effort.
///
/// A path currently present as a directory is removed as a directory,
/// anything else as a file. Failures are recorded and skipped.
pub(super) fn delete_all(
    remote: &mut dyn RemoteStore,
    deletions: &[&PathChange],
    remote_base: &str,
    summary: &mut RunSummary,
    journal: &mut Vec<String>,
    verbosity: VerbosityLevel,
) {
    if verbosity != VerbosityLevel::Quiet {
        println!();
        println!("{}", "Deleting path(s).".bold());
    }

    for change in deletions {
        if verbosity != VerbosityLevel::Quiet {
            println!("   {} ...", change.path());
        }

        let remote_path = change.path().to_remote(remote_base);
        let result = match remote.directory_exists(&remote_path) {
            Ok(true) => remote.delete_directory(&remote_path),
            Ok(false) => remote.delete_file(&remote_path),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                summary.deleted += 1;
                journal.push(format!("deleted {}", remote_path));
            }
            Err(e) => {
                log::warn!("Could not delete {}: {}", remote_path, e);
                if verbosity != VerbosityLevel::Quiet {
                    println!("     {} skipped: {}", "!".yellow(), e);
                }
                journal.push(format!("delete skipped {}: {}", remote_path, e));
                summary.delete_failures.push(DeleteFailure {
                    path: change.path().clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
