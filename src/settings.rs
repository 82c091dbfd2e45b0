use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::change::RepoPath;
use crate::error::SyncError;

/// Default FTP control port
const DEFAULT_FTP_PORT: u16 = 21;

/// Deployment configuration for one project
///
/// Loaded once at startup and handed to every component by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub svn: SvnConfig,

    #[serde(default)]
    pub ftp: FtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Display name, also used to name staging directories
    #[serde(default = "default_project_name")]
    pub name: String,

    /// Skip the confirmation prompt
    #[serde(default)]
    pub force: bool,
}

fn default_project_name() -> String {
    "Untitled Project".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: default_project_name(),
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SvnConfig {
    /// Repository URL
    #[serde(default)]
    pub uri: String,

    /// Directory containing the `svn` executable (default: search `PATH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Only deploy paths below this repository directory, re-rooted to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
}

impl SvnConfig {
    pub fn repository_url(&self) -> Result<Url, SyncError> {
        Url::parse(self.uri.trim()).map_err(|e| {
            SyncError::Configuration(format!("Invalid svn.uri '{}': {}", self.uri, e))
        })
    }

    pub fn source_root(&self) -> Option<RepoPath> {
        self.source_root.as_deref().and_then(RepoPath::new)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    /// `ftp://[user@]host[:port][/base/path]`
    #[serde(default)]
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Prompted for when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Connect timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    10
}

impl Default for FtpConfig {
    fn default() -> Self {
        FtpConfig {
            uri: String::new(),
            user: None,
            password: None,
            timeout: default_timeout(),
        }
    }
}

/// Connection target resolved from `ftp.uri`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    /// Remote directory that mirrors the repository root
    pub base_path: String,
}

impl FtpConfig {
    pub fn target(&self) -> Result<FtpTarget, SyncError> {
        let invalid = |reason: &str| {
            SyncError::Configuration(format!("Invalid ftp.uri '{}': {}", self.uri, reason))
        };

        let url = Url::parse(self.uri.trim()).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "ftp" {
            return Err(invalid("scheme must be ftp"));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?
            .to_string();

        let user = self
            .user
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| Some(url.username().to_string()).filter(|u| !u.is_empty()))
            .unwrap_or_else(|| "anonymous".to_string());

        let password = self
            .password
            .clone()
            .or_else(|| url.password().map(str::to_string))
            .filter(|p| !p.is_empty());

        let base_path = match url.path().trim_end_matches('/') {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        Ok(FtpTarget {
            host,
            port: url.port().unwrap_or(DEFAULT_FTP_PORT),
            user,
            password,
            base_path,
        })
    }
}

impl DeployConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SyncError::Configuration(format!("Config file '{}' is not readable: {}", path.display(), e)))?;

        let config: DeployConfig = toml::from_str(&content).map_err(|e| {
            SyncError::Configuration(format!(
                "Config file '{}' is not a valid configuration: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path or the default location
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = crate::config::ConfigManager::default_config_path()?;
                Self::load(&default_path).with_context(|| {
                    format!(
                        "No --config given and the default config could not be loaded. \
                         Run 'svn-ftp-sync config --init {}' to create one.",
                        default_path.display()
                    )
                })
            }
        }
    }

    /// Check that every required setting is present and well-formed
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.svn.uri.trim().is_empty() {
            return Err(SyncError::Configuration("svn.uri is required".to_string()));
        }
        self.svn.repository_url()?;

        if self.ftp.uri.trim().is_empty() {
            return Err(SyncError::Configuration("ftp.uri is required".to_string()));
        }
        self.ftp.target()?;

        if self.project.name.trim().is_empty() {
            return Err(SyncError::Configuration(
                "project.name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// A commented starting point for a new project
    pub fn sample() -> &'static str {
        r#"# svn-ftp-sync project configuration

[project]
name = "My Website"
# Skip the confirmation prompt
force = false

[svn]
uri = "https://svn.example.com/repos/website"
# Directory holding the svn executable (default: search PATH)
# bin = "/usr/local/bin"
# user = "deploy"
# password = ""
# Only deploy paths below this repository directory
# source_root = "trunk"

[ftp]
uri = "ftp://ftp.example.com:21/public_html"
user = "deploy"
# Leave empty to be prompted
password = ""
timeout = 10
"#
    }

    /// Print the effective configuration with secrets masked
    pub fn print(&self) {
        let mask = |secret: &Option<String>| match secret.as_deref() {
            Some(s) if !s.is_empty() => "********".to_string(),
            _ => "Not set".to_string(),
        };
        let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "Not set".to_string());

        println!("{}", "Project:".bold());
        println!("  {}: {}", "Name".cyan(), self.project.name);
        println!("  {}: {}", "Force".cyan(), self.project.force);

        println!("{}", "Subversion:".bold());
        println!("  {}: {}", "URI".cyan(), self.svn.uri);
        println!(
            "  {}: {}",
            "Executable dir".cyan(),
            self.svn
                .bin
                .as_ref()
                .map(|b| b.display().to_string())
                .unwrap_or_else(|| "PATH".to_string())
        );
        println!("  {}: {}", "User".cyan(), or_unset(&self.svn.user));
        println!("  {}: {}", "Password".cyan(), mask(&self.svn.password));
        println!("  {}: {}", "Source root".cyan(), or_unset(&self.svn.source_root));

        println!("{}", "FTP:".bold());
        println!("  {}: {}", "URI".cyan(), self.ftp.uri);
        println!("  {}: {}", "User".cyan(), or_unset(&self.ftp.user));
        println!("  {}: {}", "Password".cyan(), mask(&self.ftp.password));
        println!("  {}: {}s", "Timeout".cyan(), self.ftp.timeout);
    }
}
