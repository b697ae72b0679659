//! WeddingwallHandle - opaque handle wrapping WeddingwallCore.

use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::c_void;
use std::os::raw::c_char;
use std::path::PathBuf;
use std::sync::Arc;

use weddingwall_core::{
    events::{EventSink, SharedEventSink},
    paths::DesktopPathProvider,
    services::{EventLightboxHost, GalleryView, SlideshowTicker},
    AppError, AppResult, Collection, WeddingwallCore,
};

/// Callback function type for events.
/// - `name`: event name (null-terminated UTF-8)
/// - `payload`: JSON payload (null-terminated UTF-8)
/// - `user_data`: user-provided context pointer
pub type EventCallback =
    extern "C" fn(name: *const c_char, payload: *const c_char, user_data: *mut c_void);

/// Stored callback with user data.
pub struct StoredCallback {
    pub callback: EventCallback,
    pub user_data: *mut c_void,
}

// SAFETY: user_data is managed by the caller and must be thread-safe
unsafe impl Send for StoredCallback {}
unsafe impl Sync for StoredCallback {}

/// FFI event sink that forwards events to a C callback.
pub struct FfiEventSink {
    callback: RwLock<Option<StoredCallback>>,
}

impl FfiEventSink {
    pub fn new() -> Self {
        Self {
            callback: RwLock::new(None),
        }
    }

    pub fn set_callback(&self, callback: EventCallback, user_data: *mut c_void) {
        *self.callback.write() = Some(StoredCallback { callback, user_data });
    }

    pub fn clear_callback(&self) {
        *self.callback.write() = None;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.read().is_some()
    }
}

impl Default for FfiEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for FfiEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        // Copied out so the callback may replace itself.
        let Some((callback, user_data)) = self
            .callback
            .read()
            .as_ref()
            .map(|stored| (stored.callback, stored.user_data))
        else {
            return;
        };
        if let (Ok(name_cstr), Ok(payload_cstr)) = (
            std::ffi::CString::new(event_name),
            std::ffi::CString::new(payload_json),
        ) {
            callback(name_cstr.as_ptr(), payload_cstr.as_ptr(), user_data);
        }
    }
}

/// Opaque handle exposed to C.
///
/// Owns the tokio runtime that runs pollers and backend calls, plus the
/// gallery views the frontend has mounted.
///
/// The `views` and `slideshow` locks are never held while core code runs,
/// so the event callback may call back into any handle function.
pub struct WeddingwallHandle {
    pub core: WeddingwallCore,
    pub event_sink: Arc<FfiEventSink>,
    pub views: Mutex<HashMap<Collection, Arc<GalleryView>>>,
    pub slideshow: Mutex<Option<SlideshowTicker>>,
    pub runtime: tokio::runtime::Runtime,
}

impl WeddingwallHandle {
    pub fn new(data_dir: Option<PathBuf>) -> AppResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("weddingwall-worker")
            .enable_all()
            .build()?;

        let path_provider = Arc::new(match data_dir {
            Some(dir) => DesktopPathProvider::with_base_dir(dir),
            None => DesktopPathProvider::new(),
        });
        let event_sink = Arc::new(FfiEventSink::new());
        let shared_sink: SharedEventSink = event_sink.clone();

        let core = WeddingwallCore::new(path_provider, shared_sink)?;

        Ok(Self {
            core,
            event_sink,
            views: Mutex::new(HashMap::new()),
            slideshow: Mutex::new(None),
            runtime,
        })
    }

    /// Mount the view of a collection unless it is already mounted.
    pub fn mount(&self, collection: Collection) {
        if self.views.lock().contains_key(&collection) {
            return;
        }

        let view = {
            let _enter = self.runtime.enter();
            let host = Arc::new(EventLightboxHost::new(self.event_sink.clone()));
            self.core.mount_gallery(collection, host)
        };

        // Another thread may have mounted the same collection meanwhile.
        let spare = match self.views.lock().entry(collection) {
            Entry::Occupied(_) => Some(view),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(view));
                None
            }
        };
        if let Some(view) = spare {
            let job_id = view.job_id();
            drop(view);
            self.core.jobs().complete_job(job_id);
        }
    }

    /// Drop the view of a collection and release its job.
    pub fn unmount(&self, collection: Collection) -> bool {
        let Some(view) = self.views.lock().remove(&collection) else {
            return false;
        };
        let job_id = view.job_id();
        drop(view);
        self.core.jobs().complete_job(job_id);
        true
    }

    /// Run `f` against a mounted view.
    pub fn with_view<R>(
        &self,
        collection: Collection,
        f: impl FnOnce(&GalleryView) -> AppResult<R>,
    ) -> AppResult<R> {
        let view = self
            .views
            .lock()
            .get(&collection)
            .cloned()
            .ok_or_else(|| AppError::General(format!("gallery '{}' is not mounted", collection)))?;
        f(&view)
    }

    pub fn start_slideshow(&self) {
        if self.slideshow.lock().is_some() {
            return;
        }

        let ticker = {
            let _enter = self.runtime.enter();
            self.core.start_slideshow()
        };

        let mut slideshow = self.slideshow.lock();
        if slideshow.is_some() {
            drop(slideshow);
            let job_id = ticker.job_id();
            drop(ticker);
            self.core.jobs().complete_job(job_id);
            return;
        }
        *slideshow = Some(ticker);
    }

    pub fn stop_slideshow(&self) {
        let Some(ticker) = self.slideshow.lock().take() else {
            return;
        };
        let job_id = ticker.job_id();
        drop(ticker);
        self.core.jobs().complete_job(job_id);
    }
}

impl Drop for WeddingwallHandle {
    fn drop(&mut self) {
        let slideshow = self.slideshow.lock().take();
        drop(slideshow);
        let views = std::mem::take(&mut *self.views.lock());
        drop(views);
        self.core.shutdown();
        tracing::info!("WeddingwallHandle dropped");
    }
}
