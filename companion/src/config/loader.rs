//! Configuration loading utilities.

use std::path::{Path, PathBuf};

use eyre::WrapErr as _;
use tokio::fs;

use crate::config::{CompanionConfig, resolve_relative_path};

/// Reads and parses the config from a TOML file.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub async fn load<P: AsRef<Path>>(path: P) -> eyre::Result<CompanionConfig> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref).await.wrap_err(format!(
        "Failed to read config file at: {}",
        path_ref.display()
    ))?;
    let config: CompanionConfig = toml::from_str(&content).wrap_err(format!(
        "Failed to parse config as TOML at: {}",
        path_ref.display()
    ))?;
    Ok(config)
}

/// The config and the directory its relative paths are resolved against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CompanionConfig,
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    /// Loads `path` if given, otherwise falls back to defaults relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a given config file cannot be read or parsed, or
    /// the working directory cannot be determined.
    pub async fn from_optional_path(path: Option<&Path>) -> eyre::Result<Self> {
        match path {
            Some(path) => {
                let path = std::fs::canonicalize(path)
                    .wrap_err(format!("Config file not found at: {}", path.display()))?;
                let config = load(&path).await?;
                let base_dir = path
                    .parent()
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                Ok(Self { config, base_dir })
            }
            None => Ok(Self {
                config: CompanionConfig::default(),
                base_dir: std::env::current_dir()
                    .wrap_err("Failed to determine the working directory")?,
            }),
        }
    }

    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        resolve_relative_path(&self.base_dir, &self.config.storage.static_dir)
    }

    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        resolve_relative_path(&self.base_dir, &self.config.storage.export_path)
    }
}
