use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::issues::{RepoTarget, DEFAULT_API_BASE, DEFAULT_LIMIT};

pub const CONFIG_FILE: &str = ".issue-fetcher.toml";

const DEFAULT_OWNER: &str = "rust-lang";
const DEFAULT_REPO: &str = "rust";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: defaults.limit must be a positive integer, got {0}")]
    InvalidLimit(u32),
}

/// Top-level configuration loaded from .issue-fetcher.toml.
/// Every field is optional; the tool runs with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    /// Repository and limit used when the command line omits them
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Root of the REST API, without a trailing slash
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub owner: String,
    pub repo: String,
    pub limit: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from .issue-fetcher.toml in the current directory.
    /// Returns the default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.defaults.limit == 0 {
            return Err(ConfigError::InvalidLimit(config.defaults.limit));
        }
        Ok(config)
    }

    pub fn default_target(&self) -> RepoTarget {
        RepoTarget {
            owner: self.defaults.owner.clone(),
            repo: self.defaults.repo.clone(),
        }
    }
}
