//! Header background slideshow
//!
//! The ticker keeps its collection loaded on its own: it serves the cached
//! images and polls the backend, whether or not a gallery view of the same
//! collection is mounted.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::{EventSinkExt, SharedEventSink, SLIDESHOW_ADVANCED};
use crate::jobs::{CancelToken, JobId};
use crate::models::Collection;
use crate::services::sync::{GallerySyncEngine, PollHandle};

pub const DEFAULT_SLIDESHOW_INTERVAL: Duration = Duration::from_secs(4);

/// Rotating index over a photo list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slideshow {
    index: usize,
}

impl Slideshow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next image, wrapping at the end.
    pub fn advance(&mut self, len: usize) -> usize {
        self.sync_to_len(len);
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
        self.index
    }

    pub fn sync_to_len(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlideshowAdvanced {
    collection: Collection,
    index: usize,
    count: usize,
}

/// Drives a [`Slideshow`] from a gallery on a fixed interval.
pub struct SlideshowTicker {
    slideshow: Arc<Mutex<Slideshow>>,
    cancel: CancelToken,
    poller: Option<PollHandle>,
    task: Option<JoinHandle<()>>,
}

impl SlideshowTicker {
    /// Start rotating. Must be called inside a tokio runtime.
    pub fn start(
        engine: Arc<GallerySyncEngine>,
        events: SharedEventSink,
        interval: Duration,
        cancel: CancelToken,
    ) -> Self {
        engine.initialize();
        let poller = engine.start(cancel.clone());

        let slideshow = Arc::new(Mutex::new(Slideshow::new()));
        let shared = Arc::clone(&slideshow);
        let token = cancel.clone();
        let engine_collection = engine.collection();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first image stays up for a full interval.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let count = engine.state().len();
                if count < 2 {
                    shared
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .sync_to_len(count);
                    continue;
                }

                let index = shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .advance(count);
                events.emit_typed(
                    SLIDESHOW_ADVANCED,
                    &SlideshowAdvanced {
                        collection: engine.collection(),
                        index,
                        count,
                    },
                );
            }
        });

        tracing::info!(collection = %engine_collection, ?interval, "Slideshow started");

        Self {
            slideshow,
            cancel,
            poller: Some(poller),
            task: Some(task),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.cancel.job_id()
    }

    pub fn index(&self) -> usize {
        self.slideshow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .index()
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(mut poller) = self.poller.take() {
            poller.dispose();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SlideshowTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
