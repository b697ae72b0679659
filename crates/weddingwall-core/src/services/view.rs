//! Mounted gallery view
//!
//! Ties one sync engine to one lightbox: mounting initializes the engine,
//! starts its poller and feeds every published photo count into the
//! lightbox. Disposing (or dropping) the view stops both tasks and closes
//! the lightbox.
//!
//! Lightbox events and host resource calls raised during a transition are
//! queued and delivered only after the lightbox lock is released, so a
//! listener may read the view back from inside its callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::events::{EventSink, SharedEventSink};
use crate::jobs::{CancelToken, JobId};
use crate::models::{GalleryState, PhotoRecord};
use crate::services::lightbox::{
    Lightbox, LightboxConfig, LightboxHost, LightboxState, NavKey, SharedLightboxHost,
};
use crate::services::sync::{GallerySyncEngine, PollHandle};
use crate::utils::error::AppResult;

#[derive(Debug, Clone, Copy)]
enum HostCall {
    LockScroll,
    UnlockScroll,
    AttachKeyListener,
    DetachKeyListener,
}

enum Notice {
    Event { name: String, payload: String },
    Host(HostCall),
}

/// Notifications raised under the lightbox lock, waiting for delivery.
struct Outbox {
    queue: Mutex<Vec<Notice>>,
    events: SharedEventSink,
    host: SharedLightboxHost,
}

impl Outbox {
    fn new(events: SharedEventSink, host: SharedLightboxHost) -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
            events,
            host,
        }
    }

    fn push(&self, notice: Notice) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }

    /// Deliver everything queued so far. Call with no lock held.
    fn flush(&self) {
        let pending = std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner));
        for notice in pending {
            match notice {
                Notice::Event { name, payload } => self.events.emit(&name, &payload),
                Notice::Host(HostCall::LockScroll) => self.host.lock_scroll(),
                Notice::Host(HostCall::UnlockScroll) => self.host.unlock_scroll(),
                Notice::Host(HostCall::AttachKeyListener) => self.host.attach_key_listener(),
                Notice::Host(HostCall::DetachKeyListener) => self.host.detach_key_listener(),
            }
        }
    }
}

/// Event sink and lightbox host handed to the lightbox; both only enqueue.
struct Deferred(Arc<Outbox>);

impl EventSink for Deferred {
    fn emit(&self, event_name: &str, payload_json: &str) {
        self.0.push(Notice::Event {
            name: event_name.to_string(),
            payload: payload_json.to_string(),
        });
    }
}

impl LightboxHost for Deferred {
    fn lock_scroll(&self) {
        self.0.push(Notice::Host(HostCall::LockScroll));
    }

    fn unlock_scroll(&self) {
        self.0.push(Notice::Host(HostCall::UnlockScroll));
    }

    fn attach_key_listener(&self) {
        self.0.push(Notice::Host(HostCall::AttachKeyListener));
    }

    fn detach_key_listener(&self) {
        self.0.push(Notice::Host(HostCall::DetachKeyListener));
    }
}

pub struct GalleryView {
    engine: Arc<GallerySyncEngine>,
    lightbox: Arc<Mutex<Lightbox>>,
    outbox: Arc<Outbox>,
    cancel: CancelToken,
    poller: Option<PollHandle>,
    watcher: Option<JoinHandle<()>>,
}

impl GalleryView {
    /// Mount a view. Must be called inside a tokio runtime.
    pub fn mount(
        engine: Arc<GallerySyncEngine>,
        host: SharedLightboxHost,
        events: SharedEventSink,
        config: LightboxConfig,
        cancel: CancelToken,
    ) -> Self {
        engine.initialize();

        let outbox = Arc::new(Outbox::new(events, host));
        let deferred = Arc::new(Deferred(Arc::clone(&outbox)));
        let lightbox = Arc::new(Mutex::new(Lightbox::new(
            deferred.clone(),
            deferred,
            config,
        )));
        let poller = engine.start(cancel.clone());

        let mut rx = engine.subscribe();
        let watched = Arc::clone(&lightbox);
        let watched_outbox = Arc::clone(&outbox);
        let token = cancel.clone();
        let watcher = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let len = rx.borrow_and_update().len();
                        watched
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .sync_to_len(len);
                        watched_outbox.flush();
                    }
                }
            }
        });

        tracing::info!(collection = %engine.collection(), "Gallery view mounted");

        Self {
            engine,
            lightbox,
            outbox,
            cancel,
            poller: Some(poller),
            watcher: Some(watcher),
        }
    }

    fn lightbox(&self) -> MutexGuard<'_, Lightbox> {
        self.lightbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one lightbox operation against the current photo count, then
    /// deliver its notifications once the lock is gone.
    fn transition<T>(&self, op: impl FnOnce(&mut Lightbox, usize) -> T) -> T {
        let len = self.len();
        let result = op(&mut self.lightbox(), len);
        self.outbox.flush();
        result
    }

    fn len(&self) -> usize {
        self.engine.state().len()
    }

    pub fn engine(&self) -> &Arc<GallerySyncEngine> {
        &self.engine
    }

    pub fn state(&self) -> GalleryState {
        self.engine.state()
    }

    pub fn lightbox_state(&self) -> LightboxState {
        self.transition(|lightbox, len| {
            lightbox.sync_to_len(len);
            lightbox.state()
        })
    }

    /// Photo currently shown in the lightbox.
    pub fn current_photo(&self) -> Option<PhotoRecord> {
        let state = self.engine.state();
        let index = self.lightbox().visible_index(state.len())?;
        state.get(index).cloned()
    }

    pub fn open(&self, index: usize) -> AppResult<LightboxState> {
        self.transition(|lightbox, len| lightbox.open(index, len))
    }

    pub fn close(&self) -> LightboxState {
        self.transition(|lightbox, _| lightbox.close())
    }

    pub fn next(&self) -> LightboxState {
        self.transition(|lightbox, len| lightbox.next(len))
    }

    pub fn prev(&self) -> LightboxState {
        self.transition(|lightbox, len| lightbox.prev(len))
    }

    pub fn jump(&self, index: usize) -> AppResult<LightboxState> {
        self.transition(|lightbox, len| lightbox.jump(index, len))
    }

    pub fn handle_key(&self, key: NavKey) -> LightboxState {
        self.transition(|lightbox, len| lightbox.handle_key(key, len))
    }

    pub fn touch_start(&self, x: f32, y: f32) {
        self.lightbox().touch_start(x, y);
    }

    pub fn touch_end(&self, x: f32, y: f32) -> LightboxState {
        self.transition(|lightbox, len| lightbox.touch_end(x, y, len))
    }

    pub fn drag_move(&self, dx: f32) {
        self.lightbox().drag_move(dx);
    }

    pub fn drag_end(&self) -> LightboxState {
        self.transition(|lightbox, len| lightbox.drag_end(len))
    }

    /// Job tracking this view's background tasks.
    pub fn job_id(&self) -> JobId {
        self.cancel.job_id()
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Tear the view down. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        if let Some(mut poller) = self.poller.take() {
            poller.dispose();
        }
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.transition(|lightbox, _| lightbox.close());
    }
}

impl Drop for GalleryView {
    fn drop(&mut self) {
        if self.poller.is_some() || self.watcher.is_some() {
            tracing::debug!(collection = %self.engine.collection(), "Gallery view dropped");
        }
        self.dispose();
    }
}
