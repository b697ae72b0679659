//! WeddingWall - wedding photo showcase client
//!
//! Command-line shell over `weddingwall-core`: the guest kiosk, the
//! photographer dashboard commands and settings.

pub mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use weddingwall_core::{
    events::SharedEventSink, paths::DesktopPathProvider, AppResult, ConfigManager, PathProvider,
    SharedPathProvider, WeddingwallCore,
};

/// Application state shared by every command.
pub struct AppState {
    pub core: WeddingwallCore,
}

impl AppState {
    /// Build the state for a data directory (platform default when `None`).
    ///
    /// `backend_url` overrides the configured backend for this run only.
    pub fn new(
        data_dir: Option<PathBuf>,
        backend_url: Option<String>,
        events: SharedEventSink,
    ) -> AppResult<Self> {
        let paths = path_provider(data_dir);
        let mut config = ConfigManager::new(paths.as_ref())?.load_effective()?;
        if let Some(url) = backend_url {
            config.backend_url = url;
        }

        let core = WeddingwallCore::with_config(paths, events, config)?;
        Ok(Self { core })
    }

    pub fn paths(&self) -> &SharedPathProvider {
        self.core.paths()
    }
}

pub fn path_provider(data_dir: Option<PathBuf>) -> SharedPathProvider {
    Arc::new(match data_dir {
        Some(dir) => DesktopPathProvider::with_base_dir(dir),
        None => DesktopPathProvider::new(),
    })
}

/// Logs directory for a data directory.
pub fn get_log_dir(paths: &dyn PathProvider) -> PathBuf {
    paths.logs_dir()
}

/// Install console and daily rolling file logging.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive until exit so buffered file output is flushed.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    let _ = std::fs::create_dir_all(log_dir);
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "weddingwall.log"));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weddingwall_core::NoOpEventSink;

    #[test]
    fn test_backend_override_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            Some(dir.path().to_path_buf()),
            Some("http://example.test:9000".into()),
            Arc::new(NoOpEventSink),
        )
        .unwrap();

        assert_eq!(state.core.client.base_url(), "http://example.test:9000");

        let stored = ConfigManager::new(state.paths().as_ref())
            .unwrap()
            .load()
            .unwrap();
        assert_ne!(stored.backend_url, "http://example.test:9000");
    }

    #[test]
    fn test_invalid_backend_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = AppState::new(
            Some(dir.path().to_path_buf()),
            Some("not a url".into()),
            Arc::new(NoOpEventSink),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_log_dir_follows_data_dir() {
        let dir = TempDir::new().unwrap();
        let paths = path_provider(Some(dir.path().to_path_buf()));
        assert!(get_log_dir(paths.as_ref()).starts_with(dir.path()));
    }
}
