use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::change::{ChangeSet, PathChange};

/// Review of a change set before it is deployed
///
/// Lists every path the run will upload or delete together with the
/// revision it is taken from, in the same order the run processes them.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Project name from the configuration
    pub project: String,

    /// Requested revisions, as given on the command line
    pub revisions: String,

    /// ISO 8601 timestamp indicating when this report was generated
    pub timestamp: String,

    pub added: Vec<ReportEntry>,
    pub modified: Vec<ReportEntry>,
    pub deleted: Vec<ReportEntry>,
}

/// One path in the review
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportEntry {
    pub path: String,
    pub revision: u64,
}

impl From<&PathChange> for ReportEntry {
    fn from(change: &PathChange) -> Self {
        ReportEntry {
            path: change.path().to_string(),
            revision: change.revision(),
        }
    }
}

fn entries(paths: Vec<&PathChange>) -> Vec<ReportEntry> {
    paths.into_iter().map(ReportEntry::from).collect()
}

impl ChangeReport {
    /// Create a report from an aggregated change set
    pub fn from_change_set(project: &str, revisions: &str, changes: &ChangeSet) -> Self {
        ChangeReport {
            project: project.to_string(),
            revisions: revisions.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            added: entries(changes.added_paths()),
            modified: entries(changes.modified_paths()),
            deleted: entries(changes.deleted_paths()),
        }
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    /// Generate a markdown report
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Deployment Review: {}\n\n", self.project));
        output.push_str(&format!("**Revisions:** {}\n", self.revisions));
        output.push_str(&format!("**Generated:** {}\n\n", self.timestamp));

        if self.total() == 0 {
            output.push_str("Nothing to deploy.\n");
            return output;
        }

        for (title, entries) in self.sections() {
            output.push_str(&format!("## {} ({})\n\n", title, entries.len()));
            for entry in entries {
                output.push_str(&format!("- `{}` (r{})\n", entry.path, entry.revision));
            }
            output.push('\n');
        }

        output
    }

    /// Generate a JSON report
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
    }

    /// Print the review to the console
    pub fn print_console(&self) {
        println!(
            "{} {} {}",
            "Project".bold(),
            self.project.cyan(),
            format!("(revisions {})", self.revisions).dimmed()
        );

        for (title, entries) in self.sections() {
            println!();
            let count = entries.len().to_string();
            let count = match title {
                "Added" => count.green(),
                "Modified" => count.cyan(),
                _ => count.red(),
            };
            println!("{} path(s): {}", title.bold(), count);
            for entry in entries {
                println!("   {}  {}", entry.path, format!("(r{})", entry.revision).dimmed());
            }
        }
    }

    fn sections(&self) -> [(&'static str, &[ReportEntry]); 3] {
        [
            ("Added", self.added.as_slice()),
            ("Modified", self.modified.as_slice()),
            ("Deleted", self.deleted.as_slice()),
        ]
    }

    /// Render in the given format: `json`, `markdown`/`md`, or `console`
    pub fn render(&self, format: &str) -> Result<Option<String>> {
        match format.to_lowercase().as_str() {
            "json" => Ok(Some(self.to_json()?)),
            "markdown" | "md" => Ok(Some(self.to_markdown())),
            "console" => Ok(None),
            _ => Err(anyhow::anyhow!("Unsupported format: {format}")),
        }
    }

    /// Save report to file
    pub fn save(&self, path: &Path, format: &str) -> Result<()> {
        let content = match self.render(format)? {
            Some(content) => content,
            None => self.to_markdown(),
        };

        fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        println!(
            "{} {}",
            "Report saved to:".green().bold(),
            path.display().to_string().cyan()
        );

        Ok(())
    }
}
