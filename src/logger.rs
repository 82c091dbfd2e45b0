use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

use crate::config::ConfigManager;

/// Log files above this size are rotated at startup
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize the logging system
///
/// Sets up console logging plus a persistent deployment log in the config
/// directory.
///
/// **Console logging** can be controlled via the `RUST_LOG` environment variable:
/// - `RUST_LOG=error` - Only errors
/// - `RUST_LOG=warn` - Warnings and errors
/// - `RUST_LOG=info` - Info, warnings, and errors (default)
/// - `RUST_LOG=debug` - Also the svn command lines (passwords masked)
///
/// **File logging** records one line per deployed or deleted path, tagged with
/// the id of its [`RunLog`], and is stored at
/// `<config dir>/svn-ftp-sync.log`.
///
/// ## Examples
///
/// ```bash
/// # Show the svn invocations
/// RUST_LOG=debug svn-ftp-sync deploy -r 193-204
///
/// # No console log output (progress lines are still printed)
/// RUST_LOG=off svn-ftp-sync deploy -r HEAD
/// ```
pub fn init_logger() -> Result<()> {
    ConfigManager::ensure_config_dir()?;

    let default_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(default_level)
        .target(env_logger::Target::Stderr)
        .try_init()
        .ok(); // Ignore error if logger is already initialized

    log_to_file(&format!("Logger initialized with level: {default_level:?}"))?;

    Ok(())
}

/// Append a timestamped line to the deployment log
pub fn log_to_file(message: &str) -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}

/// Deployment log entries of one run.
///
/// Every line carries a short run id, so the steps of one deployment can
/// be picked out of the shared log with a plain `grep`. Write failures only
/// produce a warning: a full disk must not abort a half-published run.
pub struct RunLog {
    id: String,
}

impl RunLog {
    /// Open a run and record what is about to be deployed
    pub fn start(project: &str, revisions: &str, paths: usize, dry_run: bool) -> Self {
        let run = RunLog {
            id: uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
        };
        run.record(&format!(
            "Deploy started: project '{}', revision(s) {}, {} path(s){}",
            project,
            revisions,
            paths,
            if dry_run { ", dry run" } else { "" }
        ));
        run
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self, message: &str) {
        if let Err(e) = log_to_file(&format!("run {}: {}", self.id, message)) {
            log::warn!("Failed to write deployment log: {}", e);
        }
    }

    /// Record the remote operations of the run, in the order they happened
    pub fn record_journal(&self, journal: &[String]) {
        for line in journal {
            self.record(line);
        }
    }
}

/// Rotate log file if it exceeds the size limit (10MB)
pub fn rotate_log_if_needed() -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    if log_path.exists() {
        let metadata = std::fs::metadata(&log_path)?;

        if metadata.len() > MAX_LOG_SIZE {
            let old_log_path = log_path.with_extension("log.old");

            if old_log_path.exists() {
                std::fs::remove_file(&old_log_path)?;
            }

            std::fs::rename(&log_path, &old_log_path)?;

            log::info!("Log file rotated to {}", old_log_path.display());
        }
    }

    Ok(())
}
