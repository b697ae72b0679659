//! WeddingWall Core Library
//!
//! Client-side core of the WeddingWall showcase: gallery synchronization,
//! lightbox navigation and the backend client. It does not depend on any UI
//! toolkit, so the CLI and native frontends (through the FFI crate) share it.
//!
//! # Architecture
//!
//! - `models`: Data structures (PhotoRecord, Collection, GalleryState, settings)
//! - `db`: SQLite cache database
//! - `services`: Sync engine, lightbox, views, client, session, uploads
//! - `events`: Event emission abstraction (EventSink trait)
//! - `paths`: Path provider abstraction (PathProvider trait)
//! - `jobs`: Background task cancellation
//! - `utils`: Error handling and utilities
//!
//! # Example
//!
//! ```no_run
//! use weddingwall_core::{
//!     events::LoggingEventSink, paths::DesktopPathProvider, services::NoOpLightboxHost,
//!     Collection, WeddingwallCore,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> weddingwall_core::AppResult<()> {
//! let core = WeddingwallCore::new(
//!     Arc::new(DesktopPathProvider::new()),
//!     Arc::new(LoggingEventSink),
//! )?;
//! let view = core.mount_gallery(Collection::GuestPhotos, Arc::new(NoOpLightboxHost));
//! println!("{:?}", view.state().sync_status);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod events;
pub mod jobs;
pub mod models;
pub mod paths;
pub mod services;
pub mod utils;

pub use db::Database;
pub use events::{EventSink, EventSinkExt, LoggingEventSink, NoOpEventSink, SharedEventSink};
pub use jobs::{CancelToken, JobId, JobManager};
pub use models::{
    ClientConfig, Collection, GalleryState, PhotoRecord, SiteSettings, SyncStatus, UserProfile,
};
pub use paths::{DesktopPathProvider, PathProvider, SharedPathProvider};
pub use services::{
    ConfigManager, GallerySyncEngine, GalleryView, Lightbox, LightboxHost, LightboxState,
    RefreshOutcome, SessionManager, ShowcaseClient, SlideshowTicker,
};
pub use utils::{AppError, AppResult, CommandError, ErrorKind};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use services::{CollectionSource, LightboxConfig, SharedCacheStore, SharedLightboxHost, SyncConfig};

/// WeddingWall core application context.
///
/// Holds the shared resources of one running client. One sync engine exists
/// per collection; views mounted on the same collection share it.
pub struct WeddingwallCore {
    pub config: ClientConfig,
    pub path_provider: SharedPathProvider,
    pub event_sink: SharedEventSink,
    pub cache: SharedCacheStore,
    pub client: Arc<ShowcaseClient>,
    pub sessions: SessionManager,
    pub job_manager: Arc<JobManager>,
    engines: Mutex<HashMap<Collection, Arc<GallerySyncEngine>>>,
}

impl WeddingwallCore {
    /// Create a context from the on-disk configuration and cache.
    pub fn new(path_provider: SharedPathProvider, event_sink: SharedEventSink) -> AppResult<Self> {
        let config = ConfigManager::new(path_provider.as_ref())?.load_effective()?;
        Self::with_config(path_provider, event_sink, config)
    }

    /// Create a context with an explicit configuration.
    pub fn with_config(
        path_provider: SharedPathProvider,
        event_sink: SharedEventSink,
        config: ClientConfig,
    ) -> AppResult<Self> {
        let db = Database::open_with_provider(path_provider.as_ref())?;
        db.init()?;
        Self::with_cache(path_provider, event_sink, config, Arc::new(db))
    }

    /// Create a context over any cache store.
    pub fn with_cache(
        path_provider: SharedPathProvider,
        event_sink: SharedEventSink,
        config: ClientConfig,
        cache: SharedCacheStore,
    ) -> AppResult<Self> {
        config.validate()?;
        let client = Arc::new(ShowcaseClient::from_config(&config)?);
        let sessions = SessionManager::new(cache.clone(), event_sink.clone());

        if let Some(user) = sessions.restore(&client)? {
            tracing::info!(user_id = %user.user_id, "Restored stored session");
        }

        tracing::info!(backend = %client.base_url(), "Core initialized");

        Ok(Self {
            config,
            path_provider,
            event_sink,
            cache,
            client,
            sessions,
            job_manager: Arc::new(JobManager::new()),
            engines: Mutex::new(HashMap::new()),
        })
    }

    /// Sync engine of a collection, created on first use.
    pub fn engine(&self, collection: Collection) -> Arc<GallerySyncEngine> {
        let mut engines = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        engines
            .entry(collection)
            .or_insert_with(|| {
                Arc::new(GallerySyncEngine::new(
                    collection,
                    Arc::new(CollectionSource::new(self.client.clone(), collection)),
                    self.cache.clone(),
                    self.event_sink.clone(),
                    SyncConfig::from(&self.config),
                ))
            })
            .clone()
    }

    /// Mount a gallery view. Must be called inside a tokio runtime.
    pub fn mount_gallery(&self, collection: Collection, host: SharedLightboxHost) -> GalleryView {
        GalleryView::mount(
            self.engine(collection),
            host,
            self.event_sink.clone(),
            LightboxConfig {
                swipe_threshold: self.config.swipe_threshold,
            },
            self.job_manager.start_job(),
        )
    }

    /// Rotate the header backgrounds. Must be called inside a tokio runtime.
    pub fn start_slideshow(&self) -> SlideshowTicker {
        SlideshowTicker::start(
            self.engine(Collection::BackgroundImages),
            self.event_sink.clone(),
            self.config.slideshow_interval(),
            self.job_manager.start_job(),
        )
    }

    pub fn paths(&self) -> &SharedPathProvider {
        &self.path_provider
    }

    pub fn events(&self) -> &SharedEventSink {
        &self.event_sink
    }

    pub fn jobs(&self) -> &Arc<JobManager> {
        &self.job_manager
    }

    /// Cancel every background task started through this context.
    pub fn shutdown(&self) {
        tracing::info!(
            active = self.job_manager.active_job_count(),
            "Shutting down background tasks"
        );
        self.job_manager.cancel_all();
    }
}

impl Drop for WeddingwallCore {
    fn drop(&mut self) {
        self.job_manager.cancel_all();
    }
}
