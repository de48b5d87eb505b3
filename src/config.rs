use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// repository configuration stored in .sprig/config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// branch created by `init`
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// message of the root commit created by `init`
    #[serde(default = "default_initial_message")]
    pub initial_message: String,
    /// keep a copy of a file's bytes in its removal marker
    #[serde(default = "default_tombstones")]
    pub tombstones: bool,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_initial_message() -> String {
    "initial commit".to_string()
}

fn default_tombstones() -> bool {
    true
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            initial_message: default_initial_message(),
            tombstones: default_tombstones(),
        }
    }
}
