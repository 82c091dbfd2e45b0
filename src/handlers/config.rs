//! Configuration command handlers
//!
//! Shows the effective project configuration or writes a commented starting
//! point for a new one.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::config::ConfigManager;
use crate::settings::DeployConfig;

/// Handle `config --show`
pub fn handle_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = DeployConfig::load_from(config_path)?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "=".repeat(40).cyan());
    config.print();

    println!();
    println!(
        "  {} {}",
        "Log file:".dimmed(),
        ConfigManager::log_file_path()?.display()
    );
    println!(
        "  {} {}",
        "Staging root:".dimmed(),
        ConfigManager::staging_root().display()
    );

    Ok(())
}

/// Handle `config --init <path>`
pub fn handle_config_init(path: &Path) -> Result<()> {
    write_sample_config(path)?;

    println!(
        "{} {}",
        "✓ Sample configuration written to".green(),
        path.display().to_string().cyan()
    );
    println!("  Edit the [svn] and [ftp] sections, then run 'svn-ftp-sync status' to check it.");

    Ok(())
}

/// Write the sample configuration, refusing to overwrite an existing file
fn write_sample_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, DeployConfig::sample())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}
