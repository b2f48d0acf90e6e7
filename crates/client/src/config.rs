//! Client configuration read from the environment.

use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Settings the binary needs beyond [`runtime::RuntimeConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Directory for the persistent store (`SPRINTER_DATA_DIR`).
    pub data_dir: Option<PathBuf>,
    /// RON deck replacing the built-in one (`SPRINTER_DECK`).
    pub deck_path: Option<PathBuf>,
    /// Directory for `client.log` (`SPRINTER_LOG_DIR`).
    pub log_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: read_env("SPRINTER_DATA_DIR"),
            deck_path: read_env("SPRINTER_DECK"),
            log_dir: read_env("SPRINTER_LOG_DIR"),
        }
    }

    /// Configured log directory, else the platform cache directory.
    pub fn resolved_log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "symptom-sprinter")
            .map(|dirs| dirs.cache_dir().join("logs"))
            .unwrap_or_else(|| env::temp_dir().join("symptom-sprinter").join("logs"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let value = env::var(key).ok()?;
    if value.trim().is_empty() {
        return None;
    }
    value.parse().ok()
}
