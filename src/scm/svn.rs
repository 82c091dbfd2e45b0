//! Subversion backend using the `svn` CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use url::Url;

use super::{RevisionSpec, SourceRepository};
use crate::change::{RepoPath, Revision};
use crate::error::SyncError;
use crate::settings::SvnConfig;

/// Subversion client bound to one repository URL
pub struct SvnClient {
    executable: PathBuf,
    url: Url,
    username: Option<String>,
    password: Option<String>,
    /// Repository directory that change-set paths are relative to
    source_root: Option<RepoPath>,
}

impl SvnClient {
    pub fn new(url: Url) -> Self {
        SvnClient {
            executable: PathBuf::from("svn"),
            url,
            username: None,
            password: None,
            source_root: None,
        }
    }

    /// Export paths relative to `root` instead of the repository URL
    pub fn with_source_root(mut self, root: Option<RepoPath>) -> Self {
        self.source_root = root;
        self
    }

    /// Build a client from the `[svn]` configuration section
    pub fn from_config(config: &SvnConfig) -> Result<Self, SyncError> {
        let mut client =
            Self::new(config.repository_url()?).with_source_root(config.source_root());

        if let Some(bin) = &config.bin {
            client.executable = bin.join(format!("svn{}", std::env::consts::EXE_SUFFIX));
        }
        client.username = config.user.clone().filter(|u| !u.is_empty());
        client.password = config.password.clone().filter(|p| !p.is_empty());

        Ok(client)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Options shared by every invocation
    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["--non-interactive".to_string()];
        if let Some(user) = &self.username {
            args.push("--username".to_string());
            args.push(user.clone());
        }
        if let Some(password) = &self.password {
            args.push("--password".to_string());
            args.push(password.clone());
        }
        args
    }

    fn log_args(&self, revisions: &RevisionSpec) -> Vec<String> {
        let mut args = vec!["log".to_string(), "--verbose".to_string()];
        args.extend(revisions.svn_args());
        args.extend(self.common_args());
        args.push(self.url.to_string());
        args
    }

    fn export_args(&self, path: &RepoPath, revision: Revision, target: &Path) -> Result<Vec<String>, SyncError> {
        let source = self.item_url(path).map_err(|reason| SyncError::Materialization {
            path: path.clone(),
            revision,
            reason,
        })?;

        let mut args = vec![
            "export".to_string(),
            "--depth".to_string(),
            "files".to_string(),
            // directories exported earlier in the run already contain their files
            "--force".to_string(),
            "--quiet".to_string(),
            "-r".to_string(),
            revision.to_string(),
        ];
        args.extend(self.common_args());
        args.push(format!("{source}@{revision}"));
        args.push(target.to_string_lossy().to_string());
        Ok(args)
    }

    /// Repository URL of one path, percent-encoded segment by segment.
    ///
    /// Change-set paths were re-rooted below the source root, so it is put
    /// back in front of them here.
    fn item_url(&self, path: &RepoPath) -> Result<Url, String> {
        let mut url = self.url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| format!("'{}' cannot be used as a base URL", self.url))?;
            segments.pop_if_empty();
            if let Some(root) = &self.source_root {
                segments.extend(root.segments());
            }
            segments.extend(path.segments());
        }
        Ok(url)
    }

    /// Run an svn command and return stdout, or stderr on failure
    fn run_svn(&self, args: &[String]) -> Result<String, String> {
        log::debug!("Running {} {}", self.executable.display(), mask_password(args));

        let output = Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run '{}': {}", self.executable.display(), e))?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl SourceRepository for SvnClient {
    fn fetch_log(&self, revisions: &RevisionSpec) -> Result<String, SyncError> {
        self.run_svn(&self.log_args(revisions)).map_err(|reason| {
            SyncError::Configuration(format!(
                "svn log of {} for revision {} failed: {}",
                self.url, revisions, reason
            ))
        })
    }

    fn materialize(&self, path: &RepoPath, revision: Revision, destination: &Path) -> Result<(), SyncError> {
        let failed = |reason: String| SyncError::Materialization {
            path: path.clone(),
            revision,
            reason,
        };

        let target = path.to_local(destination);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                failed(format!("cannot create '{}': {}", parent.display(), e))
            })?;
        }

        let args = self.export_args(path, revision, &target)?;
        self.run_svn(&args).map_err(failed)?;
        Ok(())
    }
}

/// Render arguments for logging with the password value hidden
fn mask_password(args: &[String]) -> String {
    let mut masked = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            masked.push("********");
            hide_next = false;
        } else {
            hide_next = arg == "--password";
            masked.push(arg.as_str());
        }
    }
    masked.join(" ")
}
