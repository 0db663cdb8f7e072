//! Daemon configuration, loaded from a YAML file with CLI overrides on top

use std::{io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// System fallback path to use if no config can be found with XDG
const FALLBACK_CONFIG_PATH: &str = "/etc/drcplumber/config.yaml";

/// Represents all possible errors loading a [Config]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Expose the inertial and magnetic sensors as a motion device
    pub motion: bool,
    /// How often to scan for new devices
    pub scan_interval_ms: u64,
    /// Open this hidraw path directly instead of scanning
    pub device: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            motion: false,
            scan_interval_ms: 1000,
            device: None,
        }
    }
}

impl Config {
    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file(path: PathBuf) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the given path, or from the first config
    /// file found in the XDG config directories with an /etc fallback.
    /// Missing files mean defaults; unreadable ones are an error.
    pub fn load(path: Option<PathBuf>) -> Result<Config, LoadError> {
        let path = match path {
            Some(path) => path,
            None => match Config::locate() {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };
        log::debug!("Loading configuration from {path:?}");
        Config::from_yaml_file(path)
    }

    /// Returns the path of the first config file that exists, if any
    fn locate() -> Option<PathBuf> {
        if let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("drcplumber") {
            if let Some(path) = base_dirs.find_config_file("config.yaml") {
                return Some(path);
            }
        } else {
            log::warn!("Unable to determine XDG config paths. Using fallback path.");
        }

        let fallback = PathBuf::from(FALLBACK_CONFIG_PATH);
        fallback.exists().then_some(fallback)
    }
}
