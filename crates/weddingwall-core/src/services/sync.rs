//! Gallery sync engine
//!
//! Keeps one gallery's photo list fresh while never regressing to an empty
//! or error view:
//! - `initialize` serves the cached list right away when there is one
//! - `refresh` fetches with a bounded timeout and only replaces photos on a
//!   non-empty success
//! - failures are swallowed and keep the last known good photos on screen
//!
//! Every refresh takes a request generation. A completion that is not newer
//! than the last applied success is discarded, so a slow response can never
//! overwrite a newer one.
//!
//! `gallery:updated` is emitted after every internal lock is released.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::{EventSinkExt, SharedEventSink, GALLERY_UPDATED};
use crate::jobs::CancelToken;
use crate::models::{ClientConfig, Collection, GalleryState, PhotoRecord, SyncStatus};
use crate::services::cache::{self, SharedCacheStore};
use crate::services::client::PhotoSource;
use crate::utils::error::{AppError, ErrorKind};

/// Timing policy of a sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub fetch_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl From<&ClientConfig> for SyncConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// What a single refresh did to the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "error")]
pub enum RefreshOutcome {
    /// New photos applied and cached
    Updated,
    /// Same photos as before
    Unchanged,
    /// The source answered with zero photos
    EmptyResult,
    /// Fetch failed; last known good photos kept
    Failed(ErrorKind),
    /// A newer refresh already completed
    Superseded,
}

/// Owner of one gallery's [`GalleryState`].
pub struct GallerySyncEngine {
    collection: Collection,
    source: Arc<dyn PhotoSource>,
    cache: SharedCacheStore,
    events: SharedEventSink,
    config: SyncConfig,
    state_tx: watch::Sender<GalleryState>,
    next_generation: AtomicU64,
    /// Generation of the last applied successful fetch
    applied_generation: Mutex<u64>,
    /// The shown photos have not reached the cache yet
    cache_pending: AtomicBool,
}

impl GallerySyncEngine {
    pub fn new(
        collection: Collection,
        source: Arc<dyn PhotoSource>,
        cache: SharedCacheStore,
        events: SharedEventSink,
        config: SyncConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(GalleryState::new(collection));
        Self {
            collection,
            source,
            cache,
            events,
            config,
            state_tx,
            next_generation: AtomicU64::new(0),
            applied_generation: Mutex::new(0),
            cache_pending: AtomicBool::new(false),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Current snapshot.
    pub fn state(&self) -> GalleryState {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<GalleryState> {
        self.state_tx.subscribe()
    }

    /// Serve the cached list, if any, before the first fetch.
    pub fn initialize(&self) -> GalleryState {
        let cached = match cache::load_photos(self.cache.as_ref(), self.collection) {
            Ok(photos) => photos.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(collection = %self.collection, "Cache read failed: {}", e);
                Vec::new()
            }
        };

        let changed = self.state_tx.send_if_modified(|state| {
            if !state.is_empty() || state.sync_status != SyncStatus::Loading {
                return false;
            }
            if cached.is_empty() {
                return false;
            }
            state.photos = Arc::new(cached);
            state.sync_status = SyncStatus::StaleCache;
            true
        });

        let state = self.state();
        if changed {
            tracing::info!(
                collection = %self.collection,
                count = state.len(),
                "Serving cached photos"
            );
            self.publish(&state);
        }
        state
    }

    /// Fetch once and apply the result.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = match tokio::time::timeout(self.config.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(self.config.fetch_timeout)),
        };

        let Ok(mut applied) = self.applied_generation.lock() else {
            tracing::error!(collection = %self.collection, "Sync state lock poisoned");
            return RefreshOutcome::Failed(ErrorKind::Other);
        };

        if generation <= *applied {
            tracing::debug!(
                collection = %self.collection,
                generation,
                applied = *applied,
                "Discarding superseded refresh"
            );
            return RefreshOutcome::Superseded;
        }

        let (outcome, update) = match result {
            Ok(photos) if photos.is_empty() => {
                *applied = generation;
                self.apply_empty()
            }
            Ok(photos) => {
                *applied = generation;
                self.apply_photos(photos)
            }
            Err(e) => self.apply_failure(e),
        };
        drop(applied);

        if let Some(state) = update {
            self.publish(&state);
        }
        outcome
    }

    fn apply_photos(&self, photos: Vec<PhotoRecord>) -> (RefreshOutcome, Option<GalleryState>) {
        let now = chrono::Utc::now();
        let mut unchanged = false;

        self.state_tx.send_if_modified(|state| {
            unchanged = *state.photos == photos && state.sync_status == SyncStatus::Ready;
            state.last_successful_fetch = Some(now);
            if unchanged {
                return false;
            }
            state.photos = Arc::new(photos);
            state.sync_status = SyncStatus::Ready;
            true
        });

        let state = self.state();
        if unchanged {
            if self.cache_pending.load(Ordering::SeqCst) {
                tracing::debug!(collection = %self.collection, "Retrying cache write");
                self.persist(&state.photos);
            }
            return (RefreshOutcome::Unchanged, None);
        }

        self.persist(&state.photos);
        tracing::info!(collection = %self.collection, count = state.len(), "Gallery updated");
        (RefreshOutcome::Updated, Some(state))
    }

    /// Write the shown photos through to the cache. A failed write is
    /// retried on the next successful refresh, even an unchanged one.
    fn persist(&self, photos: &[PhotoRecord]) {
        match cache::store_photos(self.cache.as_ref(), self.collection, photos) {
            Ok(()) => self.cache_pending.store(false, Ordering::SeqCst),
            Err(e) => {
                tracing::warn!(collection = %self.collection, "Failed to persist photos: {}", e);
                self.cache_pending.store(true, Ordering::SeqCst);
            }
        }
    }

    fn apply_empty(&self) -> (RefreshOutcome, Option<GalleryState>) {
        // Photos may still be cached if initialize was skipped.
        let cached = if self.state_tx.borrow().is_empty() {
            cache::load_photos(self.cache.as_ref(), self.collection)
                .ok()
                .flatten()
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let changed = self.state_tx.send_if_modified(move |state| {
            if !state.is_empty() {
                return false;
            }
            if cached.is_empty() {
                if state.sync_status == SyncStatus::Empty {
                    return false;
                }
                state.sync_status = SyncStatus::Empty;
            } else {
                state.photos = Arc::new(cached);
                state.sync_status = SyncStatus::StaleCache;
            }
            true
        });

        if !changed {
            tracing::debug!(collection = %self.collection, "Empty response ignored, keeping photos");
            return (RefreshOutcome::EmptyResult, None);
        }

        let state = self.state();
        tracing::info!(collection = %self.collection, status = ?state.sync_status, "Empty response");
        (RefreshOutcome::EmptyResult, Some(state))
    }

    fn apply_failure(&self, error: AppError) -> (RefreshOutcome, Option<GalleryState>) {
        tracing::warn!(collection = %self.collection, "Refresh failed: {}", error);

        let changed = self.state_tx.send_if_modified(|state| {
            if state.sync_status == SyncStatus::Ready {
                state.sync_status = SyncStatus::StaleCache;
                true
            } else {
                false
            }
        });

        let outcome = RefreshOutcome::Failed(error.kind());
        (outcome, changed.then(|| self.state()))
    }

    fn publish(&self, state: &GalleryState) {
        self.events.emit_typed(GALLERY_UPDATED, &state.summary());
    }

    /// Refresh now and then on every poll interval until the handle goes away.
    pub fn start(self: &Arc<Self>, cancel: CancelToken) -> PollHandle {
        let engine = Arc::clone(self);
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    _ = token.cancelled() => break,
                    outcome = engine.refresh() => outcome,
                };
                tracing::debug!(collection = %engine.collection, ?outcome, "Poll refresh");
            }

            tracing::debug!(collection = %engine.collection, "Poller stopped");
        });

        PollHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Running poller. Dropping it stops the poller.
pub struct PollHandle {
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn job_id(&self) -> u64 {
        self.cancel.job_id()
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Stop polling. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NoOpEventSink, RecordingEventSink};
    use crate::services::cache::{CacheStore, MemoryCacheStore};
    use crate::utils::error::AppResult;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    enum Step {
        Photos(Vec<PhotoRecord>),
        Fail,
        Hang,
    }

    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PhotoSource for ScriptedSource {
        async fn fetch(&self) -> AppResult<Vec<PhotoRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Photos(photos)) => Ok(photos),
                Some(Step::Fail) | None => Err(AppError::Network("connection refused".into())),
                Some(Step::Hang) => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn photos(n: usize) -> Vec<PhotoRecord> {
        (0..n)
            .map(|i| PhotoRecord::new(format!("p{}", i), format!("data:image/png;base64,{}", i)))
            .collect()
    }

    fn engine(source: Arc<dyn PhotoSource>, cache: Arc<MemoryCacheStore>) -> GallerySyncEngine {
        GallerySyncEngine::new(
            Collection::GuestPhotos,
            source,
            cache,
            Arc::new(NoOpEventSink),
            SyncConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_initialize_without_cache_is_loading() {
        let engine = engine(ScriptedSource::new(vec![]), Arc::new(MemoryCacheStore::new()));
        let state = engine.initialize();
        assert_eq!(state.sync_status, SyncStatus::Loading);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_success_replaces_and_caches() {
        let cache = Arc::new(MemoryCacheStore::new());
        let engine = engine(ScriptedSource::new(vec![Step::Photos(photos(2))]), cache.clone());
        engine.initialize();

        assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
        let state = engine.state();
        assert_eq!(state.sync_status, SyncStatus::Ready);
        assert_eq!(state.len(), 2);
        assert!(state.last_successful_fetch.is_some());

        let cached = cache::load_photos(cache.as_ref(), Collection::GuestPhotos).unwrap();
        assert_eq!(cached, Some(photos(2)));
    }

    #[tokio::test]
    async fn test_identical_refresh_is_unchanged() {
        let source = ScriptedSource::new(vec![Step::Photos(photos(3)), Step::Photos(photos(3))]);
        let engine = engine(source, Arc::new(MemoryCacheStore::new()));
        let mut rx = engine.subscribe();

        assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
        let _ = rx.borrow_and_update();
        let first = engine.state();

        assert_eq!(engine.refresh().await, RefreshOutcome::Unchanged);
        let second = engine.state();
        assert_eq!(first.photos, second.photos);
        assert_eq!(second.sync_status, SyncStatus::Ready);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failure_degrades_ready_to_stale() {
        let source = ScriptedSource::new(vec![Step::Photos(photos(2)), Step::Fail]);
        let engine = engine(source, Arc::new(MemoryCacheStore::new()));

        engine.refresh().await;
        assert_eq!(
            engine.refresh().await,
            RefreshOutcome::Failed(ErrorKind::Network)
        );
        let state = engine.state();
        assert_eq!(state.sync_status, SyncStatus::StaleCache);
        assert_eq!(state.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_while_loading_stays_loading() {
        let engine = engine(ScriptedSource::new(vec![Step::Fail]), Arc::new(MemoryCacheStore::new()));
        engine.initialize();
        engine.refresh().await;
        assert_eq!(engine.state().sync_status, SyncStatus::Loading);
    }

    #[tokio::test]
    async fn test_empty_result_never_clears_photos() {
        let source = ScriptedSource::new(vec![Step::Photos(photos(2)), Step::Photos(vec![])]);
        let cache = Arc::new(MemoryCacheStore::new());
        let engine = engine(source, cache.clone());

        engine.refresh().await;
        assert_eq!(engine.refresh().await, RefreshOutcome::EmptyResult);
        assert_eq!(engine.state().len(), 2);
        assert_eq!(engine.state().sync_status, SyncStatus::Ready);
        assert_eq!(
            cache::load_photos(cache.as_ref(), Collection::GuestPhotos).unwrap(),
            Some(photos(2))
        );
    }

    #[tokio::test]
    async fn test_empty_result_falls_back_to_cache_when_uninitialized() {
        let cache = Arc::new(MemoryCacheStore::new());
        cache::store_photos(cache.as_ref(), Collection::GuestPhotos, &photos(1)).unwrap();
        let engine = engine(ScriptedSource::new(vec![Step::Photos(vec![])]), cache);

        engine.refresh().await;
        let state = engine.state();
        assert_eq!(state.sync_status, SyncStatus::StaleCache);
        assert_eq!(state.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let engine = engine(ScriptedSource::new(vec![Step::Hang]), Arc::new(MemoryCacheStore::new()));
        assert_eq!(
            engine.refresh().await,
            RefreshOutcome::Failed(ErrorKind::Timeout)
        );
    }

    #[tokio::test]
    async fn test_corrupt_cache_write_is_swallowed() {
        struct ReadOnlyStore;
        impl CacheStore for ReadOnlyStore {
            fn get(&self, _key: &str) -> AppResult<Option<String>> {
                Ok(None)
            }
            fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
                Err(AppError::General("disk full".into()))
            }
            fn remove(&self, _key: &str) -> AppResult<()> {
                Ok(())
            }
        }

        let engine = GallerySyncEngine::new(
            Collection::WallPhotos,
            ScriptedSource::new(vec![Step::Photos(photos(1))]),
            Arc::new(ReadOnlyStore),
            Arc::new(NoOpEventSink),
            SyncConfig::default(),
        );
        assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
        assert_eq!(engine.state().sync_status, SyncStatus::Ready);
    }

    #[tokio::test]
    async fn test_failed_cache_write_is_retried_on_unchanged_refresh() {
        struct FlakyStore {
            inner: MemoryCacheStore,
            fail_next: AtomicBool,
        }
        impl CacheStore for FlakyStore {
            fn get(&self, key: &str) -> AppResult<Option<String>> {
                self.inner.get(key)
            }
            fn set(&self, key: &str, value: &str) -> AppResult<()> {
                if self.fail_next.swap(false, Ordering::SeqCst) {
                    return Err(AppError::General("database is locked".into()));
                }
                self.inner.set(key, value)
            }
            fn remove(&self, key: &str) -> AppResult<()> {
                self.inner.remove(key)
            }
        }

        let store = Arc::new(FlakyStore {
            inner: MemoryCacheStore::new(),
            fail_next: AtomicBool::new(true),
        });
        let engine = GallerySyncEngine::new(
            Collection::GuestPhotos,
            ScriptedSource::new(vec![Step::Photos(photos(2)), Step::Photos(photos(2))]),
            store.clone(),
            Arc::new(NoOpEventSink),
            SyncConfig::default(),
        );

        assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
        assert_eq!(cache::load_photos(store.as_ref(), Collection::GuestPhotos).unwrap(), None);

        assert_eq!(engine.refresh().await, RefreshOutcome::Unchanged);
        assert_eq!(
            cache::load_photos(store.as_ref(), Collection::GuestPhotos).unwrap(),
            Some(photos(2))
        );
    }

    #[test]
    fn test_empty_result_reads_cache_outside_state_lock() {
        use std::sync::{OnceLock, Weak};

        /// Store that reads the engine's state back on every cache read.
        struct ReadBackStore {
            inner: MemoryCacheStore,
            engine: OnceLock<Weak<GallerySyncEngine>>,
        }
        impl CacheStore for ReadBackStore {
            fn get(&self, key: &str) -> AppResult<Option<String>> {
                if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
                    let _ = engine.state();
                }
                self.inner.get(key)
            }
            fn set(&self, key: &str, value: &str) -> AppResult<()> {
                self.inner.set(key, value)
            }
            fn remove(&self, key: &str) -> AppResult<()> {
                self.inner.remove(key)
            }
        }

        let store = Arc::new(ReadBackStore {
            inner: MemoryCacheStore::new(),
            engine: OnceLock::new(),
        });
        cache::store_photos(store.as_ref(), Collection::GuestPhotos, &photos(2)).unwrap();
        let engine = Arc::new(GallerySyncEngine::new(
            Collection::GuestPhotos,
            ScriptedSource::new(vec![Step::Photos(vec![])]),
            store.clone(),
            Arc::new(NoOpEventSink),
            SyncConfig::default(),
        ));
        let _ = store.engine.set(Arc::downgrade(&engine));

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = Arc::clone(&engine);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let _ = tx.send(rt.block_on(worker.refresh()));
        });

        let outcome = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("refresh blocked on the state lock");
        assert_eq!(outcome, RefreshOutcome::EmptyResult);
        assert_eq!(engine.state().sync_status, SyncStatus::StaleCache);
        assert_eq!(engine.state().len(), 2);
    }

    #[tokio::test]
    async fn test_gallery_updated_event() {
        let events = Arc::new(RecordingEventSink::new());
        let engine = GallerySyncEngine::new(
            Collection::GuestPhotos,
            ScriptedSource::new(vec![Step::Photos(photos(2))]),
            Arc::new(MemoryCacheStore::new()),
            events.clone(),
            SyncConfig::default(),
        );

        engine.refresh().await;
        let payloads = events.payloads(GALLERY_UPDATED);
        assert_eq!(payloads.len(), 1);
        let payload: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(payload["count"], 2);
        assert_eq!(payload["syncStatus"], "ready");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_does_not_clobber_newer() {
        struct SlowThenFast {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl PhotoSource for SlowThenFast {
            async fn fetch(&self) -> AppResult<Vec<PhotoRecord>> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(photos(1))
                } else {
                    Ok(photos(4))
                }
            }
        }

        let engine = Arc::new(engine(
            Arc::new(SlowThenFast {
                calls: AtomicUsize::new(0),
            }),
            Arc::new(MemoryCacheStore::new()),
        ));

        let slow = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
        assert_eq!(slow.await.unwrap(), RefreshOutcome::Superseded);
        assert_eq!(engine.state().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_refreshes_immediately_then_on_interval() {
        let source = ScriptedSource::new(vec![]);
        let engine = Arc::new(engine(source.clone(), Arc::new(MemoryCacheStore::new())));

        let mut handle = engine.start(CancelToken::new(1));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        handle.dispose();
        assert!(!handle.is_active());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_poller() {
        let source = ScriptedSource::new(vec![]);
        let engine = Arc::new(engine(source.clone(), Arc::new(MemoryCacheStore::new())));

        let handle = engine.start(CancelToken::new(2));
        tokio::time::sleep(Duration::from_millis(1)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
