use std::path::PathBuf;

use thiserror::Error;

use crate::change::{RepoPath, Revision};

/// Errors raised by the deployment core.
///
/// Remote failures are split into navigation and write errors so the
/// deletion phase can report them precisely, even though it absorbs both.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or unreadable run configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The revision log could not be parsed
    #[error("Failed to parse log line {line}: {reason}")]
    Parsing { line: usize, reason: String },

    /// A change kind token outside of A/M/D
    #[error("Unknown change kind '{0}'")]
    UnknownChangeKind(String),

    /// The source repository could not produce a local copy of a path
    #[error("Failed to export '{path}' at r{revision}: {reason}")]
    Materialization {
        path: RepoPath,
        revision: Revision,
        reason: String,
    },

    /// A remote directory could not be entered
    #[error("Failed changing directory to '{path}': {reason}")]
    Navigation { path: String, reason: String },

    /// A remote mutation (mkdir, upload, delete) failed
    #[error("Failed {operation} '{path}': {reason}")]
    RemoteWrite {
        operation: &'static str,
        path: String,
        reason: String,
    },

    /// A materialized item is missing from the staging directory
    #[error("Staged item '{}' does not exist", .0.display())]
    MissingStagedItem(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn navigation(path: impl Into<String>, reason: impl ToString) -> Self {
        SyncError::Navigation {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn remote_write(
        operation: &'static str,
        path: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        SyncError::RemoteWrite {
            operation,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error came from the remote store
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Navigation { .. } | SyncError::RemoteWrite { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_path_and_operation() {
        let err = SyncError::remote_write("uploading", "/www/index.php", "550 Permission denied");
        let msg = err.to_string();
        assert!(msg.contains("uploading"));
        assert!(msg.contains("/www/index.php"));
        assert!(msg.contains("550"));
        assert!(err.is_remote());

        let err = SyncError::Materialization {
            path: RepoPath::new("trunk/a.txt").unwrap(),
            revision: 12,
            reason: "svn: E170000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to export 'trunk/a.txt' at r12: svn: E170000"
        );
        assert!(!err.is_remote());
    }
}
