//! User configuration, read from `~/.curlbox/config.yaml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DATA_DIR_ENV, DEFAULT_HISTORY_LIMIT, DEFAULT_SAVED_LIMIT,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where history, saved requests and logs are written
    pub data_dir: PathBuf,
    pub history_limit: usize,
    pub saved_limit: usize,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: config_dir(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            saved_limit: DEFAULT_SAVED_LIMIT,
            log_level: String::from("info"),
        }
    }
}

/// `$CURLBOX_DIR`, else `~/.curlbox`, else `./.curlbox`
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

impl Config {
    /// Load the config file from the config directory
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load a config file; a missing file yields the defaults with
    /// `data_dir` next to the file
    pub fn load_from(path: &Path) -> Result<Self> {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(config_dir);
        if !path.exists() {
            return Ok(Config {
                data_dir: base_dir,
                ..Config::default()
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file `{}`", path.display()))?;

        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = base_dir.clone();
        } else if config.data_dir.is_relative() {
            config.data_dir = base_dir.join(&config.data_dir);
        }
        if config.history_limit == 0 {
            config.history_limit = DEFAULT_HISTORY_LIMIT;
        }
        if config.saved_limit == 0 {
            config.saved_limit = DEFAULT_SAVED_LIMIT;
        }
        Ok(config)
    }

    /// Write the config as YAML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file `{}`", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults_next_to_it() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.data_dir, temp_dir.path());
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.saved_limit, DEFAULT_SAVED_LIMIT);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "history_limit: 5\ndata_dir: data\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.saved_limit, DEFAULT_SAVED_LIMIT);
        assert_eq!(config.data_dir, temp_dir.path().join("data"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn save_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.yaml");
        let config = Config {
            data_dir: temp_dir.path().join("store"),
            history_limit: 7,
            saved_limit: 9,
            log_level: "debug".into(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "history_limit: [not a number").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
