use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::SyncError;

/// Fresh local directory receiving the exported paths of one run.
///
/// Never reused and never removed by the run itself; see
/// [`cleanup_staging`].
#[derive(Debug, Clone)]
pub struct StagingArea {
    path: PathBuf,
}

impl StagingArea {
    /// Create a uniquely named directory below `root`
    pub fn create(root: &Path, project_name: &str) -> Result<Self, SyncError> {
        let name = format!(
            "{}-{}-{}",
            slug(project_name),
            Local::now().format("%Y%m%d-%H%M%S"),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );
        let path = root.join(name);

        fs::create_dir_all(&path)?;
        log::debug!("Created staging directory {}", path.display());

        Ok(StagingArea { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "project".to_string()
    } else {
        slug.to_string()
    }
}

/// A staging directory left behind by an earlier run
#[derive(Debug)]
pub struct StaleStaging {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
    pub size_bytes: u64,
}

/// Staging directories below `root` not modified for `max_age_days`
pub fn find_stale_staging(root: &Path, max_age_days: i64) -> Result<Vec<StaleStaging>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let threshold = chrono::Duration::try_days(max_age_days)
        .and_then(|age| Local::now().checked_sub_signed(age))
        .ok_or_else(|| anyhow::anyhow!("Maximum age of {max_age_days} days is out of range"))?;
    let mut stale = Vec::new();

    for entry in fs::read_dir(root)
        .with_context(|| format!("Failed to read staging root: {}", root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_dir() {
            continue;
        }

        let modified: DateTime<Local> = metadata.modified()?.into();
        if modified >= threshold {
            continue;
        }

        let size_bytes = WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.metadata().ok())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum();

        stale.push(StaleStaging {
            path,
            modified,
            size_bytes,
        });
    }

    stale.sort_by(|a, b| a.modified.cmp(&b.modified));
    Ok(stale)
}

/// Remove stale staging directories (or only list them in dry run mode).
///
/// Returns the number of directories removed or that would be removed.
pub fn cleanup_staging(root: &Path, max_age_days: i64, dry_run: bool) -> Result<usize> {
    let stale = find_stale_staging(root, max_age_days)?;

    if dry_run {
        for entry in &stale {
            println!(
                "  - {} ({} bytes, {})",
                entry.path.display(),
                entry.size_bytes,
                entry.modified.format("%Y-%m-%d %H:%M")
            );
        }
        return Ok(stale.len());
    }

    Ok(remove_stale(&stale))
}

/// Delete each directory, returning how many were actually removed
fn remove_stale(stale: &[StaleStaging]) -> usize {
    stale
        .iter()
        .filter(|entry| match fs::remove_dir_all(&entry.path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to delete staging directory {}: {}", entry.path.display(), e);
                false
            }
        })
        .count()
}
