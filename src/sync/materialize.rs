use colored::Colorize;
use std::path::Path;

use crate::change::PathChange;
use crate::error::SyncError;
use crate::scm::SourceRepository;
use crate::VerbosityLevel;

/// Export every upload path into `staging`, in listing order.
///
/// The first failure ends the run.
pub(super) fn materialize_all(
    source: &dyn SourceRepository,
    uploads: &[&PathChange],
    staging: &Path,
    verbosity: VerbosityLevel,
) -> Result<(), SyncError> {
    if verbosity != VerbosityLevel::Quiet {
        println!();
        println!(
            "{}",
            "Exporting added/modified path(s) to a temp directory.".bold()
        );
        if verbosity == VerbosityLevel::Verbose {
            println!("  {} {}", "Staging:".dimmed(), staging.display());
        }
    }

    for change in uploads {
        if verbosity != VerbosityLevel::Quiet {
            println!("   {} ...", change.path());
        }
        source.materialize(change.path(), change.revision(), staging)?;
    }

    Ok(())
}
