use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Embedding model identifier, must be one of the known models
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Files larger than this are skipped with a warning
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_model() -> String {
    crate::model::DEFAULT_MODEL.to_string()
}
fn default_k() -> usize {
    10
}
fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            default_k: default_k(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&content).context("Failed to parse config")?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }
}

pub fn docgrep_dir() -> PathBuf {
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".docgrep")
}

pub fn config_path() -> PathBuf {
    docgrep_dir().join("config.toml")
}

pub fn cache_db_path() -> PathBuf {
    docgrep_dir().join("cache.db")
}

pub fn models_dir() -> PathBuf {
    docgrep_dir().join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "all-MiniLM-L6-v2");
        assert_eq!(config.default_k, 10);
        assert_eq!(config.max_file_bytes, 1024 * 1024);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("default_k = 3").unwrap();
        assert_eq!(config.default_k, 3);
        assert_eq!(config.model, "all-MiniLM-L6-v2");
    }
}
