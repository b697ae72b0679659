//! Path provider abstraction.
//!
//! Resolves where the client keeps its cache database, configuration and
//! logs, so that the CLI, native frontends and tests can each choose a root.

use std::path::PathBuf;
use std::sync::Arc;

/// Trait for providing application data paths.
pub trait PathProvider: Send + Sync {
    /// Get the root application data directory.
    fn app_data_dir(&self) -> PathBuf;

    /// Get the local cache database path.
    fn cache_db_path(&self) -> PathBuf {
        self.app_data_dir().join("Cache").join("weddingwall.db")
    }

    /// Get the client configuration file path.
    fn config_path(&self) -> PathBuf {
        self.app_data_dir().join("Config").join("client.json")
    }

    /// Get the logs directory.
    fn logs_dir(&self) -> PathBuf {
        self.app_data_dir().join("Logs")
    }
}

/// Shared reference to a PathProvider implementation.
pub type SharedPathProvider = Arc<dyn PathProvider>;

/// Desktop path provider using the platform data directory.
///
/// `%APPDATA%/WeddingWall` on Windows, `~/.local/share/WeddingWall` on Linux,
/// `~/Library/Application Support/WeddingWall` on macOS.
#[derive(Debug, Clone)]
pub struct DesktopPathProvider {
    app_data_dir: PathBuf,
}

impl DesktopPathProvider {
    pub fn new() -> Self {
        let app_data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("WeddingWall");
        Self { app_data_dir }
    }

    /// Create a provider rooted at a custom base directory.
    ///
    /// Useful for testing and for `--data-dir`.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            app_data_dir: base_dir,
        }
    }
}

impl Default for DesktopPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for DesktopPathProvider {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_base_dir() {
        let provider = DesktopPathProvider::with_base_dir(PathBuf::from("/tmp/ww"));
        assert_eq!(provider.cache_db_path(), PathBuf::from("/tmp/ww/Cache/weddingwall.db"));
        assert_eq!(provider.config_path(), PathBuf::from("/tmp/ww/Config/client.json"));
        assert_eq!(provider.logs_dir(), PathBuf::from("/tmp/ww/Logs"));
    }
}
