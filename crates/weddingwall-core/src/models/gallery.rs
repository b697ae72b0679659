//! Gallery state models

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::collection::Collection;
use super::photo::PhotoRecord;

/// Where the displayed photos came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// No cache, first fetch pending
    #[default]
    Loading,
    /// Photos come from the latest successful fetch
    Ready,
    /// Photos come from the cache or an earlier fetch; the latest fetch is pending or failed
    StaleCache,
    /// Confirmed zero photos and nothing cached
    Empty,
}

impl SyncStatus {
    /// Whether this status requires a non-empty photo list.
    pub fn has_photos(&self) -> bool {
        matches!(self, SyncStatus::Ready | SyncStatus::StaleCache)
    }
}

/// Snapshot of one gallery as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryState {
    pub collection: Collection,
    /// Display order equals the order returned by the source
    pub photos: Arc<Vec<PhotoRecord>>,
    pub sync_status: SyncStatus,
    pub last_successful_fetch: Option<DateTime<Utc>>,
}

impl GalleryState {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            photos: Arc::new(Vec::new()),
            sync_status: SyncStatus::Loading,
            last_successful_fetch: None,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRecord> {
        self.photos.get(index)
    }

    /// Compact form used for events and logs (no image payloads).
    pub fn summary(&self) -> GallerySummary {
        GallerySummary {
            collection: self.collection,
            sync_status: self.sync_status,
            count: self.photos.len(),
            last_successful_fetch: self.last_successful_fetch,
        }
    }
}

/// Event payload describing a gallery without its photos.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySummary {
    pub collection: Collection,
    pub sync_status: SyncStatus,
    pub count: usize,
    pub last_successful_fetch: Option<DateTime<Utc>>,
}
