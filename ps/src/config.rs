//! Configuration for prefstore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Path to the preference store directory
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Past destinations kept per user
    #[serde(default = "default_max_destinations")]
    pub max_destinations: usize,
}

/// Default store location, shared with the travel agent
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("travelagent")
        .join("preferences")
}

fn default_max_destinations() -> usize {
    crate::DEFAULT_MAX_DESTINATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            max_destinations: default_max_destinations(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("travelagent").join("prefstore.yml")),
            Some(PathBuf::from("prefstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
