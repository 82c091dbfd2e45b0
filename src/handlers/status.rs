//! Status command handler
//!
//! Shows what a deploy of the given revisions would do, without exporting or
//! connecting to anything.

use anyhow::Result;
use std::path::Path;

use super::deploy::load_change_set;
use crate::report::ChangeReport;
use crate::scm::{RevisionSpec, SvnClient};
use crate::settings::DeployConfig;

/// Handle the status command
pub fn handle_status(
    config_path: Option<&Path>,
    revisions: &str,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let config = DeployConfig::load_from(config_path)?;
    let revisions: RevisionSpec = revisions.parse()?;
    let client = SvnClient::from_config(&config.svn)?;

    let changes = load_change_set(&config, &client, &revisions)?;
    let report = ChangeReport::from_change_set(&config.project.name, &revisions.to_string(), &changes);

    if let Some(path) = output {
        return report.save(path, format);
    }

    match report.render(format)? {
        Some(content) => println!("{}", content),
        None => report.print_console(),
    }

    Ok(())
}
