//! Configuration data types for the companion service.
//!
//! Every section and field has a default, so an empty file (or no file at all)
//! yields a working configuration.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::blocking::DEFAULT_HOSTS_PATH;

/// HTTP server binding configuration section.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port for the HTTP and WebSocket listener.
    pub port: u16,
    /// Bind address for the listener.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            bind: "0.0.0.0".to_owned(),
        }
    }
}

/// Hosts file blocking configuration section.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BlockingConfig {
    /// Hosts file holding the tagged block. Used as given, never resolved against the config directory.
    pub hosts_path: PathBuf,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            hosts_path: PathBuf::from(DEFAULT_HOSTS_PATH),
        }
    }
}

/// Local files served or written by the service.
///
/// Relative paths are interpreted relative to the config file when not absolute.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory `index.html` is served from.
    pub static_dir: String,
    /// JSON file backing `/api/export` and `/api/import`.
    pub export_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_dir: ".".to_owned(),
            export_path: "./ultra_pomodoro_cloud.json".to_owned(),
        }
    }
}

/// Root config structure of the companion service.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompanionConfig {
    pub server: ServerConfig,
    pub blocking: BlockingConfig,
    pub storage: StorageConfig,
}

/// Resolves a path to an absolute one.
///
/// If the path is absolute, returns it as-is. If relative, joins it with
/// `base_dir` and normalizes the result to remove redundant components like `./`.
pub fn resolve_relative_path(base_dir: &Path, relative_path: &str) -> PathBuf {
    let path = Path::new(relative_path);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    // We can't use canonicalize() because the file might not exist yet
    normalize_path(&resolved)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        use Component as C;
        match component {
            C::Normal(c) => {
                result.push(c);
            }
            C::ParentDir => {
                result.pop();
            }
            C::CurDir => {}
            C::RootDir | C::Prefix(_) => {
                result.push(component);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_base() {
        assert_eq!(
            resolve_relative_path(Path::new("/etc/pomodoro"), "./cloud.json"),
            PathBuf::from("/etc/pomodoro/cloud.json")
        );
        assert_eq!(
            resolve_relative_path(Path::new("/etc/pomodoro"), "../www/./index"),
            PathBuf::from("/etc/www/index")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        assert_eq!(
            resolve_relative_path(Path::new("/etc/pomodoro"), "/var/lib/cloud.json"),
            PathBuf::from("/var/lib/cloud.json")
        );
    }
}
