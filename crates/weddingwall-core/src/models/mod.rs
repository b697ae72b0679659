//! WeddingWall data models

pub mod collection;
pub mod gallery;
pub mod photo;
pub mod session;
pub mod settings;

pub use collection::Collection;
pub use gallery::{GalleryState, GallerySummary, SyncStatus};
pub use photo::{PhotoRecord, PhotoSummary, PhotoUploadRequest, SimpleUploadRequest, UploadReceipt};
pub use session::{MessageResponse, SessionExchange, UserProfile};
pub use settings::{ClientConfig, ResolvedSettings, SiteSettings};
