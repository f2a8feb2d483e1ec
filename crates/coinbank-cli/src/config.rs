use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COLLECTION, DEFAULT_DB_FILENAME};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CoinbankConfig {
    pub database: DatabaseSection,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSection {
    pub uri: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl CoinbankConfig {
    pub fn new(uri: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: DatabaseSection {
                uri: uri.into(),
                collection: collection.into(),
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(DEFAULT_DB_FILENAME))
}

pub fn read_config(path: &Path) -> anyhow::Result<CoinbankConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CoinbankConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("coinbank"));
        }
    }
    Ok(home_dir()?.join(".config").join("coinbank"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("coinbank"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("coinbank"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = CoinbankConfig::new("sqlite:///tmp/bank.db", "chores");

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_collection_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\nuri = \"bank.db\"\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.database.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database\n").unwrap();

        assert!(read_config(&path).is_err());
    }
}
