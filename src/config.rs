//! Optional user configuration from `config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fs::binary::{BinaryPolicy, DEFAULT_BINARY_EXTENSIONS, DEFAULT_MAX_FILE_BYTES};
use crate::knowledge::DEFAULT_VERTEX_CEILING;

/// Overrides both the config and state directories when set
pub const HOME_ENV: &str = "SCOUT_HOME";

const APP_DIR: &str = "scout";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the knowledge store is kept
    pub state_dir: Option<PathBuf>,
    /// Vertex count above which the store is pruned before saving
    pub vertex_ceiling: usize,
    /// An interrupted run younger than this is not persisted
    pub min_persist_secs: u64,
    pub max_file_bytes: u64,
    pub binary_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: None,
            vertex_ceiling: DEFAULT_VERTEX_CEILING,
            min_persist_secs: 3,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            binary_extensions: DEFAULT_BINARY_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load from the default location. No file means defaults; a file that
    /// does not parse is an error.
    pub fn load() -> Result<Self> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Directory holding the state file
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(home) = home_override() {
            return Ok(home);
        }
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .context("Failed to determine a data directory; set SCOUT_HOME")
    }

    pub fn min_persist(&self) -> Duration {
        Duration::from_secs(self.min_persist_secs)
    }

    pub fn binary_policy(&self) -> BinaryPolicy {
        BinaryPolicy::new(self.binary_extensions.iter().cloned(), self.max_file_bytes)
    }
}

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn config_dir() -> Option<PathBuf> {
    home_override().or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.vertex_ceiling, 100_000);
        assert_eq!(config.min_persist(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "vertex_ceiling = 500\nbinary_extensions = [\"log\"]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.vertex_ceiling, 500);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert!(config.binary_policy().is_excluded(Path::new("a.log"), 1));
        assert!(!config.binary_policy().is_excluded(Path::new("a.png"), 1));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "vertex_ceiling = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    #[serial]
    fn test_home_env_overrides_state_dir() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            state_dir: Some(PathBuf::from("/configured")),
            ..Config::default()
        };

        std::env::set_var(HOME_ENV, temp.path());
        let dir = config.state_dir().unwrap();
        std::env::remove_var(HOME_ENV);

        assert_eq!(dir, temp.path());
        assert_eq!(config.state_dir().unwrap(), PathBuf::from("/configured"));
    }

    #[test]
    #[serial]
    fn test_home_env_locates_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "min_persist_secs = 0\n").unwrap();

        std::env::set_var(HOME_ENV, temp.path());
        let config = Config::load();
        std::env::remove_var(HOME_ENV);

        assert_eq!(config.unwrap().min_persist_secs, 0);
    }
}
