//! TOML-based application configuration.
//!
//! Stores engine settings, currently the collectible pool directory
//! the reward allocator draws from.
//!
//! Configuration is stored at `~/.config/habitloom/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Collectible pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Directory whose files form the collectible pool. Relative paths
    /// resolve against the data directory.
    #[serde(default = "default_pool_dir")]
    pub dir: PathBuf,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            dir: default_pool_dir(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitloom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_pool_dir() -> PathBuf {
    PathBuf::from("awards")
}

impl Config {
    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = data_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(config)
    }

    /// Save the configuration.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let path = data_dir()?.join("config.toml");
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Absolute path of the collectible pool directory.
    pub fn pool_dir(&self) -> Result<PathBuf> {
        if self.pool.dir.is_absolute() {
            Ok(self.pool.dir.clone())
        } else {
            Ok(data_dir()?.join(&self.pool.dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.pool.dir, PathBuf::from("awards"));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.pool.dir, PathBuf::from("awards"));
    }
}
