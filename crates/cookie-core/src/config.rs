//! Configuration file handling
//!
//! Settings live in `config.toml` under the tool's XDG configuration
//! directory (`~/.config/cookie-sync` unless `XDG_CONFIG_HOME` points
//! elsewhere). The baseline file and local backups live in the same
//! directory. `init` writes a commented template; loading an absent or
//! incomplete file is an error that tells the user what to do.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backup;
use crate::error::{Error, Result};
use crate::merge::MergeStrategy;

/// Directory name under the XDG configuration root.
pub const CONFIG_DIR: &str = "cookie-sync";
/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";
/// Local backup directory name, beside the configuration file.
pub const BACKUP_DIR: &str = "backups";

/// Template written by `init`.
pub const DEFAULT_CONFIG: &str = r#"# cookie-sync configuration

[firefox]
# Profile selection. With neither setting, the profile marked as
# default in profiles.ini is used.
# profile_name = "default-release"
# profile_path = "/home/user/.mozilla/firefox/abcd1234.default-release"

[webdav]
# WebDAV endpoint the sync state is stored on, e.g. a Nextcloud
# files URL. Required.
url = ""
username = ""
password = ""

[sync]
# Conflict handling when both sides changed:
#   per-rule | use-newest | use-local | use-remote | do-nothing
merge_strategy = "per-rule"
# Abort without writing when a replica is unexpectedly empty.
panic = true

[backup]
# Copy the baseline into backups/ when the last backup is older than
# the interval (45s, 30m, 12h, 7d, ...).
enabled = true
interval = "1d"
# Also keep a timestamped copy of the previous remote state before
# overwriting it.
remote = false
"#;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub firefox: FirefoxSection,
    #[serde(default)]
    pub webdav: WebdavSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub backup: BackupSection,
}

/// Profile selection settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FirefoxSection {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile_path: Option<PathBuf>,
}

/// Remote endpoint settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebdavSection {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    #[serde(default = "default_panic")]
    pub panic: bool,
}

fn default_panic() -> bool {
    true
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::default(),
            panic: default_panic(),
        }
    }
}

/// Backup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSection {
    #[serde(default = "default_backup_enabled")]
    pub enabled: bool,
    #[serde(default = "default_backup_interval")]
    pub interval: String,
    #[serde(default)]
    pub remote: bool,
}

fn default_backup_enabled() -> bool {
    true
}

fn default_backup_interval() -> String {
    "1d".to_string()
}

impl Default for BackupSection {
    fn default() -> Self {
        Self {
            enabled: default_backup_enabled(),
            interval: default_backup_interval(),
            remote: false,
        }
    }
}

/// Locates, loads, and initializes the configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Use the platform configuration directory.
    pub fn from_default_dir() -> Result<Self> {
        let base = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(Self {
            dir: base.join(CONFIG_DIR),
        })
    }

    /// Use an explicit directory. Tests point this at a tempdir.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.dir.join(BACKUP_DIR)
    }

    /// Parse the configuration file.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Err(Error::ConfigNotFound { path });
        }
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse the configuration and verify everything a sync run needs.
    pub fn load_checked(&self) -> Result<AppConfig> {
        let config = self.load()?;
        if config.webdav.url.trim().is_empty() {
            return Err(Error::ConfigIncomplete {
                path: self.config_path(),
                field: "webdav.url".to_string(),
            });
        }
        backup::parse_interval(&config.backup.interval)?;
        Ok(config)
    }

    /// Write the commented template, refusing to clobber an existing
    /// file.
    pub fn init(&self) -> Result<PathBuf> {
        let path = self.config_path();
        if path.exists() {
            return Err(Error::ConfigExists { path });
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, DEFAULT_CONFIG)?;
        tracing::info!("Wrote configuration template to {}", path.display());
        Ok(path)
    }
}
