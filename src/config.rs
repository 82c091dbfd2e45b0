use anyhow::{Context, Result};
use std::path::PathBuf;

/// Directory name used below the platform config and temp directories
const APP_DIR_NAME: &str = "svn-ftp-sync";

/// Overrides the directory that receives per-run staging directories
pub const STAGING_DIR_ENV: &str = "SVN_FTP_SYNC_STAGING_DIR";

/// Locations of the deployment configuration, log and staging area
pub struct ConfigManager;

impl ConfigManager {
    /// `$XDG_CONFIG_HOME/svn-ftp-sync` when set, otherwise the platform
    /// config directory (`~/.config`, `~/Library/Application Support`,
    /// `%APPDATA%`).
    pub fn config_dir() -> Result<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(xdg_config) => PathBuf::from(xdg_config),
            None => dirs::config_dir().context("Failed to determine the config directory")?,
        };
        Ok(base.join(APP_DIR_NAME))
    }

    /// Get the default project config path (config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("svn-ftp-sync.log"))
    }

    /// Root below which every run gets its own staging directory.
    ///
    /// Defaults to a hidden directory in the system temp dir; large sites
    /// can point [`STAGING_DIR_ENV`] at a roomier disk.
    pub fn staging_root() -> PathBuf {
        match std::env::var_os(STAGING_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::temp_dir().join(format!(".{APP_DIR_NAME}")),
        }
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
        Ok(config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Run `f` with `key` set to `value`, restoring the previous value after
    fn with_env<F: FnOnce()>(key: &str, value: &str, f: F) {
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);

        f();

        match previous {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    #[test]
    #[serial]
    fn test_config_paths() {
        let config_dir = ConfigManager::config_dir().unwrap();
        assert!(config_dir.ends_with("svn-ftp-sync"));

        let config = ConfigManager::default_config_path().unwrap();
        assert!(config.to_string_lossy().ends_with("config.toml"));

        let log = ConfigManager::log_file_path().unwrap();
        assert!(log.to_string_lossy().contains("svn-ftp-sync.log"));
    }

    #[test]
    #[serial]
    fn test_xdg_config_home_respected() {
        with_env("XDG_CONFIG_HOME", "/tmp/test-xdg-config", || {
            let config_dir = ConfigManager::config_dir().unwrap();
            assert_eq!(config_dir, PathBuf::from("/tmp/test-xdg-config/svn-ftp-sync"));
        });
    }

    #[test]
    #[serial]
    fn test_staging_root_defaults_to_temp_dir() {
        with_env(STAGING_DIR_ENV, "", || {
            let staging = ConfigManager::staging_root();
            assert!(staging.starts_with(std::env::temp_dir()));
            assert!(staging.ends_with(".svn-ftp-sync"));
        });
    }

    #[test]
    #[serial]
    fn test_staging_root_override() {
        with_env(STAGING_DIR_ENV, "/srv/deploy-staging", || {
            assert_eq!(ConfigManager::staging_root(), PathBuf::from("/srv/deploy-staging"));
        });
    }
}
