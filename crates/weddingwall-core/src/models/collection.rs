//! Remote photo collections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::AppError;

/// A remote photo list feeding one gallery instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Live wedding gallery
    GuestPhotos,
    /// Portfolio wall
    WallPhotos,
    /// Header background slideshow
    BackgroundImages,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::GuestPhotos,
        Collection::WallPhotos,
        Collection::BackgroundImages,
    ];

    /// Public listing endpoint, relative to the backend URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Collection::GuestPhotos => "/api/photos/guest",
            Collection::WallPhotos => "/api/wall-photos",
            Collection::BackgroundImages => "/api/background-images",
        }
    }

    /// Authenticated upload endpoint.
    pub fn upload_endpoint(&self) -> &'static str {
        match self {
            Collection::GuestPhotos => "/api/photos/upload",
            Collection::WallPhotos => "/api/wall-photos/upload",
            Collection::BackgroundImages => "/api/background-images/upload",
        }
    }

    /// Parent path of single items; the id is appended as one path segment.
    pub fn item_endpoint(&self) -> &'static str {
        match self {
            Collection::GuestPhotos => "/api/photos",
            Collection::WallPhotos => "/api/wall-photos",
            Collection::BackgroundImages => "/api/background-images",
        }
    }

    /// Fixed cache key for the last known good list.
    pub fn cache_key(&self) -> &'static str {
        match self {
            Collection::GuestPhotos => "weddingwall.guest_photos",
            Collection::WallPhotos => "weddingwall.wall_photos",
            Collection::BackgroundImages => "weddingwall.background_images",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::GuestPhotos => "guest",
            Collection::WallPhotos => "wall",
            Collection::BackgroundImages => "background",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" | "photos" | "gallery" => Ok(Collection::GuestPhotos),
            "wall" | "portfolio" => Ok(Collection::WallPhotos),
            "background" | "backgrounds" => Ok(Collection::BackgroundImages),
            other => Err(AppError::General(format!("unknown collection: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys_are_distinct() {
        let keys: std::collections::HashSet<_> =
            Collection::ALL.iter().map(|c| c.cache_key()).collect();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn test_item_endpoint() {
        assert_eq!(Collection::WallPhotos.item_endpoint(), "/api/wall-photos");
        assert_eq!(Collection::GuestPhotos.item_endpoint(), "/api/photos");
    }

    #[test]
    fn test_parse_round_trips_display() {
        for c in Collection::ALL {
            assert_eq!(c.to_string().parse::<Collection>().unwrap(), c);
        }
        assert!("album".parse::<Collection>().is_err());
    }
}
