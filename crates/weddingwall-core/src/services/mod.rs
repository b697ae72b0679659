//! WeddingWall services

pub mod cache;
pub mod client;
pub mod lightbox;
pub mod session;
pub mod settings;
pub mod slideshow;
pub mod sync;
pub mod upload;
pub mod view;

pub use cache::{load_photos, store_photos, CacheStore, MemoryCacheStore, SharedCacheStore};
pub use client::{CollectionSource, PhotoSource, ShowcaseClient};
pub use lightbox::{
    Direction, EventLightboxHost, Lightbox, LightboxConfig, LightboxHost, LightboxState, NavKey,
    NoOpLightboxHost, SharedLightboxHost,
};
pub use session::{parse_callback_fragment, SessionManager};
pub use settings::ConfigManager;
pub use slideshow::{Slideshow, SlideshowTicker};
pub use sync::{GallerySyncEngine, PollHandle, RefreshOutcome, SyncConfig};
pub use upload::{bulk_delete, upload_to, DeleteResult, ImageUpload};
pub use view::GalleryView;
