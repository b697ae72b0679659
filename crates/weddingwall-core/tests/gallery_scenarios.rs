//! End-to-end gallery behavior: sync engine, view and lightbox together.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use weddingwall_core::events::{
    EventSink, NoOpEventSink, RecordingEventSink, LIGHTBOX_CHANGED, LIGHTBOX_SCROLL_LOCK,
};
use weddingwall_core::services::cache::{self, MemoryCacheStore};
use weddingwall_core::services::{
    EventLightboxHost, GallerySyncEngine, GalleryView, LightboxConfig, LightboxHost,
    LightboxState, NavKey, PhotoSource, RefreshOutcome, SyncConfig,
};
use weddingwall_core::{AppError, AppResult, CancelToken, Collection, PhotoRecord, SyncStatus};

#[derive(Clone)]
enum Reply {
    Photos(usize),
    Fail,
}

/// Source whose next answer the test controls.
struct SwitchableSource {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
}

impl SwitchableSource {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        })
    }

    fn set(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for SwitchableSource {
    async fn fetch(&self) -> AppResult<Vec<PhotoRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Photos(n) => Ok(photos(n)),
            Reply::Fail => Err(AppError::Network("connection refused".into())),
        }
    }
}

#[derive(Default)]
struct CountingHost {
    scroll_locks: AtomicI32,
    key_listeners: AtomicI32,
}

impl LightboxHost for CountingHost {
    fn lock_scroll(&self) {
        self.scroll_locks.fetch_add(1, Ordering::SeqCst);
    }
    fn unlock_scroll(&self) {
        self.scroll_locks.fetch_sub(1, Ordering::SeqCst);
    }
    fn attach_key_listener(&self) {
        self.key_listeners.fetch_add(1, Ordering::SeqCst);
    }
    fn detach_key_listener(&self) {
        self.key_listeners.fetch_sub(1, Ordering::SeqCst);
    }
}

fn photos(n: usize) -> Vec<PhotoRecord> {
    (0..n)
        .map(|i| PhotoRecord::new(format!("p{}", i), format!("data:image/jpeg;base64,{}", i)))
        .collect()
}

fn engine(source: Arc<SwitchableSource>, store: Arc<MemoryCacheStore>) -> Arc<GallerySyncEngine> {
    Arc::new(GallerySyncEngine::new(
        Collection::GuestPhotos,
        source,
        store,
        Arc::new(NoOpEventSink),
        SyncConfig::default(),
    ))
}

fn mount(engine: Arc<GallerySyncEngine>, host: Arc<CountingHost>) -> GalleryView {
    GalleryView::mount(
        engine,
        host,
        Arc::new(NoOpEventSink),
        LightboxConfig::default(),
        CancelToken::new(1),
    )
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn cached_photos_survive_network_failure() {
    let store = Arc::new(MemoryCacheStore::new());
    cache::store_photos(store.as_ref(), Collection::GuestPhotos, &photos(3)).unwrap();
    let source = SwitchableSource::new(Reply::Fail);

    let view = mount(engine(source.clone(), store), Arc::new(CountingHost::default()));
    assert_eq!(view.state().sync_status, SyncStatus::StaleCache);
    settle().await;

    assert_eq!(source.calls(), 1);
    let state = view.state();
    assert_eq!(state.sync_status, SyncStatus::StaleCache);
    assert_eq!(state.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn empty_response_without_cache_is_empty() {
    let source = SwitchableSource::new(Reply::Photos(0));
    let view = mount(
        engine(source, Arc::new(MemoryCacheStore::new())),
        Arc::new(CountingHost::default()),
    );
    assert_eq!(view.state().sync_status, SyncStatus::Loading);
    settle().await;

    let state = view.state();
    assert_eq!(state.sync_status, SyncStatus::Empty);
    assert!(state.is_empty());
    assert!(view.open(0).is_err());
}

#[tokio::test(start_paused = true)]
async fn prev_from_first_wraps_to_last() {
    let source = SwitchableSource::new(Reply::Photos(5));
    let view = mount(
        engine(source, Arc::new(MemoryCacheStore::new())),
        Arc::new(CountingHost::default()),
    );
    settle().await;

    view.open(0).unwrap();
    let state = view.prev();
    assert_eq!(state.current_index, Some(4));
    assert_eq!(state.pending_direction, -1);
    assert_eq!(view.current_photo().unwrap().id, "p4");
}

#[tokio::test(start_paused = true)]
async fn shrinking_collection_force_closes_lightbox() {
    let source = SwitchableSource::new(Reply::Photos(5));
    let host = Arc::new(CountingHost::default());
    let engine = engine(source.clone(), Arc::new(MemoryCacheStore::new()));
    let view = mount(engine.clone(), host.clone());
    settle().await;

    view.open(2).unwrap();
    assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 1);
    assert_eq!(host.key_listeners.load(Ordering::SeqCst), 1);

    source.set(Reply::Photos(2));
    assert_eq!(engine.refresh().await, RefreshOutcome::Updated);
    settle().await;

    // Closed by the view's watcher, before anyone touched the lightbox.
    assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
    assert_eq!(host.key_listeners.load(Ordering::SeqCst), 0);
    assert!(!view.lightbox_state().is_open);
}

#[tokio::test(start_paused = true)]
async fn short_swipe_does_nothing() {
    let source = SwitchableSource::new(Reply::Photos(5));
    let view = mount(
        engine(source, Arc::new(MemoryCacheStore::new())),
        Arc::new(CountingHost::default()),
    );
    settle().await;

    view.open(1).unwrap();
    view.touch_start(200.0, 50.0);
    let state = view.touch_end(170.0, 50.0);
    assert_eq!(state.current_index, Some(1));
    assert_eq!(state.pending_direction, 0);
}

#[tokio::test(start_paused = true)]
async fn poller_keeps_running_until_disposed() {
    let source = SwitchableSource::new(Reply::Photos(2));
    let host = Arc::new(CountingHost::default());
    let mut view = mount(engine(source.clone(), Arc::new(MemoryCacheStore::new())), host.clone());
    settle().await;
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.calls(), 4);

    view.open(1).unwrap();
    view.dispose();
    assert!(!view.is_mounted());
    assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn dropping_view_releases_everything() {
    let source = SwitchableSource::new(Reply::Photos(3));
    let host = Arc::new(CountingHost::default());
    let view = mount(engine(source.clone(), Arc::new(MemoryCacheStore::new())), host.clone());
    settle().await;

    view.open(0).unwrap();
    view.handle_key(NavKey::ArrowRight);
    drop(view);

    assert_eq!(host.scroll_locks.load(Ordering::SeqCst), 0);
    assert_eq!(host.key_listeners.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn scroll_lock_events_pair_up() {
    let events = Arc::new(RecordingEventSink::new());
    let source = SwitchableSource::new(Reply::Photos(3));
    let view = GalleryView::mount(
        engine(source, Arc::new(MemoryCacheStore::new())),
        Arc::new(EventLightboxHost::new(events.clone())),
        events.clone(),
        LightboxConfig::default(),
        CancelToken::new(9),
    );
    settle().await;

    view.open(0).unwrap();
    view.handle_key(NavKey::Escape);

    let locks = events.payloads(LIGHTBOX_SCROLL_LOCK);
    assert_eq!(locks, vec![r#"{"locked":true}"#, r#"{"locked":false}"#]);
}

/// Listener that reads the view back from inside its callback.
#[derive(Default)]
struct ReadBackSink {
    view: OnceLock<Weak<GalleryView>>,
    seen: Mutex<Vec<(String, LightboxState)>>,
}

impl EventSink for ReadBackSink {
    fn emit(&self, event_name: &str, _payload_json: &str) {
        let Some(view) = self.view.get().and_then(Weak::upgrade) else {
            return;
        };
        let state = view.lightbox_state();
        let _ = view.current_photo();
        self.seen
            .lock()
            .unwrap()
            .push((event_name.to_string(), state));
    }
}

#[test]
fn listeners_can_read_the_view_back() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();

    let sink = Arc::new(ReadBackSink::default());
    let engine = Arc::new(GallerySyncEngine::new(
        Collection::GuestPhotos,
        SwitchableSource::new(Reply::Photos(3)),
        Arc::new(MemoryCacheStore::new()),
        sink.clone(),
        SyncConfig::default(),
    ));
    let view = Arc::new(GalleryView::mount(
        engine.clone(),
        Arc::new(EventLightboxHost::new(sink.clone())),
        sink.clone(),
        LightboxConfig::default(),
        CancelToken::new(1),
    ));
    let _ = sink.view.set(Arc::downgrade(&view));
    rt.block_on(engine.refresh());
    assert_eq!(view.state().len(), 3);

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(&view);
    std::thread::spawn(move || {
        let opened = worker.open(0).ok().map(|state| state.current_index);
        let moved = worker.next().current_index;
        let closed = worker.handle_key(NavKey::Escape).is_open;
        let _ = tx.send((opened, moved, closed));
    });

    let (opened, moved, closed) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("lightbox transition blocked on its own listener");
    assert_eq!(opened, Some(Some(0)));
    assert_eq!(moved, Some(1));
    assert!(!closed);

    let seen = sink.seen.lock().unwrap().clone();
    let changes: Vec<Option<usize>> = seen
        .iter()
        .filter(|(name, _)| name == LIGHTBOX_CHANGED)
        .map(|(_, state)| state.current_index)
        .collect();
    assert_eq!(changes, vec![Some(0), Some(1), None]);
    assert_eq!(
        seen.iter()
            .filter(|(name, _)| name == LIGHTBOX_SCROLL_LOCK)
            .count(),
        2
    );
}

/// No sequence of refresh outcomes takes a non-empty gallery back to empty.
#[tokio::test]
async fn photos_never_regress_to_empty() {
    let replies = [Reply::Photos(0), Reply::Photos(2), Reply::Photos(3), Reply::Fail];

    for cached in [0usize, 2] {
        for a in 0..replies.len() {
            for b in 0..replies.len() {
                for c in 0..replies.len() {
                    let store = Arc::new(MemoryCacheStore::new());
                    if cached > 0 {
                        cache::store_photos(store.as_ref(), Collection::GuestPhotos, &photos(cached))
                            .unwrap();
                    }
                    let source = SwitchableSource::new(Reply::Fail);
                    let engine = engine(source.clone(), store.clone());
                    engine.initialize();

                    let mut seen_photos = cached > 0;
                    for reply in [&replies[a], &replies[b], &replies[c]] {
                        source.set(reply.clone());
                        engine.refresh().await;

                        let state = engine.state();
                        if seen_photos {
                            assert!(!state.is_empty());
                            let stored = cache::load_photos(store.as_ref(), Collection::GuestPhotos)
                                .unwrap()
                                .unwrap_or_default();
                            assert!(!stored.is_empty());
                        }
                        if state.sync_status.has_photos() {
                            assert!(!state.is_empty());
                        }
                        if state.sync_status == SyncStatus::Empty {
                            assert!(state.is_empty());
                        }
                        seen_photos |= !state.is_empty();
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn identical_refreshes_are_idempotent() {
    let source = SwitchableSource::new(Reply::Photos(4));
    let engine = engine(source, Arc::new(MemoryCacheStore::new()));

    engine.refresh().await;
    let first = engine.state();
    engine.refresh().await;
    let second = engine.state();

    assert_eq!(first.photos, second.photos);
    assert_eq!(second.sync_status, SyncStatus::Ready);
}
