//! Staging cleanup handler
//!
//! Removes staging directories left behind by earlier deployments.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::ConfigManager;
use crate::sync;

/// Handle cleanup command
pub fn handle_cleanup_staging(dry_run: bool, max_age_days: i64) -> Result<()> {
    let root = ConfigManager::staging_root();

    if dry_run {
        println!("{}", "Staging cleanup (dry run)".cyan().bold());
        println!("  Would remove staging directories older than {} days", max_age_days);
    } else {
        println!("{}", "Cleaning up old staging directories...".cyan().bold());
        println!("  Removing staging directories older than {} days", max_age_days);
    }
    println!("  {} {}", "Root:".dimmed(), root.display());
    println!();

    let count = sync::cleanup_staging(&root, max_age_days, dry_run)
        .context("Failed to cleanup staging directories")?;

    if count == 0 {
        println!("{}", "No old staging directories to delete".dimmed());
    } else if dry_run {
        println!("{} {} staging directories would be deleted", "✓".green(), count);
    } else {
        println!("{} Deleted {} old staging directories", "✓".green(), count);
    }

    Ok(())
}
