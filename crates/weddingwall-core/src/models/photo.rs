//! Photo data models

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::error::{AppError, AppResult};

/// One displayable photo as returned by a remote collection.
///
/// Field names follow the backend wire format so that cached collections
/// deserialize with the same code path as fresh responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Opaque identifier, unique within a collection
    #[serde(rename = "photo_id")]
    pub id: String,
    /// Image payload (data URL or plain URL)
    #[serde(rename = "image_data")]
    pub image: String,
    /// Photographer notes shown as a caption
    #[serde(rename = "photographer_notes", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timestamp: Option<String>,
}

impl PhotoRecord {
    /// Minimal record, mostly useful for tests and samples.
    pub fn new(id: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            caption: None,
            filename: None,
            wedding_date: None,
            photographer_id: None,
            photographer_name: None,
            upload_timestamp: None,
        }
    }

    /// Attach a caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Caption if present and not blank.
    pub fn display_caption(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Validate a freshly received collection.
    ///
    /// Records without an id or image make the whole response malformed.
    /// Duplicate ids keep their first occurrence.
    pub fn validate_collection(records: Vec<PhotoRecord>) -> AppResult<Vec<PhotoRecord>> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut out = Vec::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(AppError::MalformedResponse(format!(
                    "photo at position {} has no id",
                    position
                )));
            }
            if record.image.trim().is_empty() {
                return Err(AppError::MalformedResponse(format!(
                    "photo {} has no image data",
                    record.id
                )));
            }
            if !seen.insert(record.id.clone()) {
                tracing::warn!(photo_id = %record.id, "Duplicate photo id in response, keeping first");
                continue;
            }
            out.push(record);
        }

        Ok(out)
    }
}

/// Dashboard listing entry (the listing endpoint omits the image payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub photo_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub wedding_date: Option<String>,
    #[serde(default)]
    pub photographer_notes: Option<String>,
    #[serde(default)]
    pub upload_timestamp: Option<String>,
}

/// Body for a live-gallery photo upload.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoUploadRequest {
    pub filename: String,
    pub image_data: String,
    pub wedding_date: String,
    pub photographer_notes: Option<String>,
}

/// Body for wall photo and background image uploads.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleUploadRequest {
    pub filename: String,
    pub image_data: String,
}

/// Server acknowledgement of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub photo_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_guest_photo() {
        let json = r#"{
            "photo_id": "p1",
            "filename": "ring.jpg",
            "image_data": "data:image/jpeg;base64,AAAA",
            "wedding_date": "2026-02-14",
            "photographer_notes": "Ring ceremony",
            "photographer_id": "user_1",
            "photographer_name": "Asha",
            "upload_timestamp": "2026-02-14T10:00:00+00:00",
            "created_at": "2026-02-14T10:00:00"
        }"#;
        let photo: PhotoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(photo.id, "p1");
        assert_eq!(photo.display_caption(), Some("Ring ceremony"));
        assert_eq!(photo.filename.as_deref(), Some("ring.jpg"));
    }

    #[test]
    fn test_wall_photo_without_notes() {
        let json = r#"{"photo_id": "w1", "image_data": "https://cdn/x.jpg"}"#;
        let photo: PhotoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(photo.caption, None);
        assert_eq!(photo.display_caption(), None);
    }

    #[test]
    fn test_missing_image_is_a_parse_error() {
        let json = r#"{"photo_id": "p1"}"#;
        assert!(serde_json::from_str::<PhotoRecord>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let records = vec![PhotoRecord::new("a", "img"), PhotoRecord::new(" ", "img")];
        let err = PhotoRecord::validate_collection(records).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_validate_dedupes_keeping_order() {
        let records = vec![
            PhotoRecord::new("a", "1"),
            PhotoRecord::new("b", "2"),
            PhotoRecord::new("a", "3"),
        ];
        let out = PhotoRecord::validate_collection(records).unwrap();
        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(out[0].image, "1");
    }

    #[test]
    fn test_blank_caption_hidden() {
        let photo = PhotoRecord::new("a", "img").with_caption("   ");
        assert_eq!(photo.display_caption(), None);
    }
}
