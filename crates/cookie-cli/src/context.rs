//! Shared command context
//!
//! Resolves where to read configuration from and which Firefox profile to
//! operate on, so individual commands don't repeat the lookup logic.

use std::path::PathBuf;

use cookie_core::{AppConfig, ConfigStore};
use cookie_firefox::FirefoxProfile;

use crate::error::Result;

/// Everything a command needs before it can touch the local store.
pub struct CommandContext {
    store: ConfigStore,
    profile_name: Option<String>,
    profile_path: Option<PathBuf>,
}

impl CommandContext {
    /// Build a context from the global CLI flags, using the platform
    /// configuration directory.
    pub fn new(profile_name: Option<String>, profile_path: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: ConfigStore::from_default_dir()?,
            profile_name,
            profile_path,
        })
    }

    /// Build a context rooted at an explicit configuration directory.
    pub fn with_store(
        store: ConfigStore,
        profile_name: Option<String>,
        profile_path: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            profile_name,
            profile_path,
        }
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    ///
    /// Commands that only touch the local store (list, export, import, clear)
    /// work fine without a config file; only profile overrides matter there.
    pub fn config_or_default(&self) -> Result<AppConfig> {
        match self.store.load() {
            Ok(config) => Ok(config),
            Err(cookie_core::Error::ConfigNotFound { .. }) => Ok(AppConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the configuration and insist that it is complete enough to sync.
    pub fn require_config(&self) -> Result<AppConfig> {
        Ok(self.store.load_checked()?)
    }

    /// Pick the Firefox profile to operate on.
    ///
    /// The global CLI flags take precedence over the `[firefox]` section of
    /// the config file.
    pub fn select_profile(&self, config: &AppConfig) -> Result<FirefoxProfile> {
        let name = self
            .profile_name
            .as_deref()
            .or(config.firefox.profile_name.as_deref());
        let path = self
            .profile_path
            .as_deref()
            .or(config.firefox.profile_path.as_deref());

        let root = cookie_firefox::default_root()?;
        let profile = cookie_firefox::select(&root, name, path)?;
        tracing::debug!(
            "Operating on profile '{}' at {}",
            profile.name,
            profile.path.display()
        );
        Ok(profile)
    }
}
