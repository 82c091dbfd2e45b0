//! Deploy command handler
//!
//! Loads the project configuration, derives the change set for the requested
//! revisions and hands it to the deployment pipeline.

use anyhow::{Context, Result};
use colored::Colorize;
use inquire::Password;
use std::path::Path;
use std::time::Duration;

use crate::change::{change_set_from_log, ChangeSet};
use crate::config::ConfigManager;
use crate::error::SyncError;
use crate::logger::RunLog;
use crate::remote::{FtpStore, MemoryStore};
use crate::scm::{RevisionSpec, SourceRepository, SvnClient};
use crate::settings::{DeployConfig, FtpTarget};
use crate::sync::{
    is_interactive, ConfirmationGate, PromptGate, RunOutcome, SyncDriver, SyncOptions, Unattended,
};
use crate::VerbosityLevel;

/// Fetch the log for `revisions` and aggregate it into a change set
pub(crate) fn load_change_set(
    config: &DeployConfig,
    client: &dyn SourceRepository,
    revisions: &RevisionSpec,
) -> Result<ChangeSet> {
    log::info!("Fetching log for revision(s) {}", revisions);
    let log_text = client
        .fetch_log(revisions)
        .with_context(|| format!("Failed to read the log for revision(s) {revisions}"))?;

    let source_root = config.svn.source_root();
    let changes = change_set_from_log(&log_text, source_root.as_ref())
        .context("Failed to parse the revision log")?;

    Ok(changes)
}

/// Handle the deploy command
pub fn handle_deploy(
    config_path: Option<&Path>,
    revisions: &str,
    force: bool,
    dry_run: bool,
    verbosity: VerbosityLevel,
) -> Result<()> {
    let mut config = DeployConfig::load_from(config_path)?;
    if force {
        config.project.force = true;
    }

    let revisions: RevisionSpec = revisions.parse()?;
    let target = config.ftp.target()?;
    let client = SvnClient::from_config(&config.svn)?;

    if verbosity != VerbosityLevel::Quiet {
        let mode = if dry_run { " (dry run)" } else { "" };
        println!(
            "{}",
            format!("Deploying revision(s) {}{}", revisions, mode).cyan().bold()
        );
        println!("  {} {}", "Repository:".dimmed(), client.url());
        println!(
            "  {} {}:{}{}",
            "Target:".dimmed(),
            target.host,
            target.port,
            target.base_path
        );
        println!();
    }

    let changes = load_change_set(&config, &client, &revisions)?;

    let run_log = RunLog::start(
        &config.project.name,
        &revisions.to_string(),
        changes.len(),
        dry_run,
    );

    let options = SyncOptions {
        project: config.project.name.clone(),
        revisions: revisions.to_string(),
        remote_base: target.base_path.clone(),
        force: config.project.force,
        verbosity,
    };

    let mut gate: Box<dyn ConfirmationGate> = if config.project.force {
        Box::new(Unattended)
    } else {
        Box::new(PromptGate)
    };

    let mut driver = SyncDriver::new(&client, options, ConfigManager::staging_root());

    let result = if dry_run {
        let mut store = MemoryStore::new();
        let remote = &mut store;
        let result = driver.run(&changes, gate.as_mut(), move || Ok(remote));

        if result.is_ok() && verbosity != VerbosityLevel::Quiet && !store.operations().is_empty() {
            println!();
            println!("{}", "Operations that would have been sent:".bold());
            for op in store.operations() {
                println!("  {}", op);
            }
        }
        result
    } else {
        let timeout = Duration::from_secs(config.ftp.timeout);
        driver.run(&changes, gate.as_mut(), || {
            let password = resolve_password(&target)?;
            FtpStore::connect(&target, &password, timeout)
        })
    };

    run_log.record_journal(driver.journal());

    match result {
        Ok(RunOutcome::Completed(summary)) => {
            run_log.record(&format!(
                "Deploy finished: {} file(s) uploaded, {} deleted, {} deletion(s) skipped",
                summary.uploaded_files,
                summary.deleted,
                summary.delete_failures.len()
            ));

            if verbosity == VerbosityLevel::Quiet {
                println!("Done");
            } else {
                if !changes.is_empty() {
                    summary.print();
                }
                println!();
                println!("{}", "Done.".green().bold());
            }
            Ok(())
        }
        Ok(RunOutcome::Aborted) => {
            run_log.record("Deploy aborted by operator");
            println!("{}", "Aborted.".yellow());
            Ok(())
        }
        Err(e) => {
            run_log.record(&format!("Deploy failed: {e}"));
            Err(e).context("Deployment failed")
        }
    }
}

/// FTP password from the configuration, or asked for on the terminal
fn resolve_password(target: &FtpTarget) -> Result<String, SyncError> {
    if let Some(password) = &target.password {
        return Ok(password.clone());
    }

    if !is_interactive() {
        return Err(SyncError::Configuration(
            "ftp.password is not set and no terminal is attached to prompt for it".to_string(),
        ));
    }

    Password::new(&format!("FTP password for {}@{}:", target.user, target.host))
        .without_confirmation()
        .prompt()
        .map_err(|e| SyncError::Configuration(format!("Failed to read FTP password: {e}")))
}
