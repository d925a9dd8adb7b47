// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration persistence (save/load).

use crate::config::InfoConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Manages the configuration file.
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for the user's config directory.
    pub fn new() -> Result<Self, ConfigError> {
        let project_dirs =
            ProjectDirs::from("", "", "infopanel").ok_or(ConfigError::NoConfigDir)?;
        Self::with_dir(project_dirs.config_dir())
    }

    /// Create a config manager rooted at `dir`, creating it if needed.
    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&config_dir)?;
        Ok(Self { config_dir })
    }

    /// Get the path to the main config file.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Load the config, or defaults if there is no file yet.
    pub fn load_config(&self) -> Result<InfoConfig, ConfigError> {
        let path = self.config_path();
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let content = fs::read_to_string(&path)?;
            Ok(InfoConfig::from_toml(&content)?)
        } else {
            Ok(InfoConfig::default())
        }
    }

    /// Save the config.
    pub fn save_config(&self, config: &InfoConfig) -> Result<(), ConfigError> {
        let content = config.to_toml()?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infopanel_data::MediaType;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_dir(dir.path().join("nested")).expect("manager");
        assert_eq!(manager.load_config().expect("defaults"), InfoConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_dir(dir.path()).expect("manager");
        let mut config = InfoConfig::default();
        config.search.delay_ms = 50;
        config.search.searchable_media.push(MediaType::Photo);
        manager.save_config(&config).expect("save");
        assert_eq!(manager.load_config().expect("load"), config);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_dir(dir.path()).expect("manager");
        fs::write(manager.config_path(), "search = 3").expect("write");
        assert!(matches!(manager.load_config(), Err(ConfigError::TomlParse(_))));
    }
}
