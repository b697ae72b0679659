//! Photo uploads and deletions from the dashboard
//!
//! Images travel to the backend as `data:` URLs inside JSON bodies. Only
//! JPEG, PNG and WebP are accepted, detected from the content rather than
//! the file extension.

use base64::Engine;
use image::ImageFormat;
use serde::Serialize;
use std::path::Path;

use crate::models::{Collection, PhotoUploadRequest, SimpleUploadRequest, UploadReceipt};
use crate::services::client::ShowcaseClient;
use crate::utils::error::{AppError, AppResult, CommandError};
use crate::utils::sanitize::sanitize_filename_component;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024; // 10MB

/// A validated image ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: &'static str,
    pub size: usize,
    pub data_url: String,
}

impl ImageUpload {
    pub fn from_bytes(filename: &str, bytes: &[u8], max_bytes: u64) -> AppResult<Self> {
        if bytes.is_empty() {
            return Err(AppError::InvalidUpload("file is empty".into()));
        }
        check_size(bytes.len() as u64, max_bytes)?;

        let format = image::guess_format(bytes)
            .map_err(|_| AppError::UnsupportedFormat("unrecognized image data".into()))?;
        let mime_type = match format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            other => {
                return Err(AppError::UnsupportedFormat(format!(
                    "{:?} (must be JPEG, PNG or WebP)",
                    other
                )))
            }
        };

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        Ok(Self {
            filename: sanitize_filename_component(filename),
            mime_type,
            size: bytes.len(),
            data_url: format!("data:{};base64,{}", mime_type, encoded),
        })
    }

    pub fn from_path(path: &Path, max_bytes: u64) -> AppResult<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(AppError::InvalidUpload(format!(
                "not a file: {}",
                path.display()
            )));
        }
        check_size(metadata.len(), max_bytes)?;

        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo");
        Self::from_bytes(filename, &bytes, max_bytes)
    }

    /// Live gallery body. `wedding_date` defaults to today.
    pub fn into_photo_request(
        self,
        notes: Option<String>,
        wedding_date: Option<String>,
    ) -> PhotoUploadRequest {
        PhotoUploadRequest {
            filename: self.filename,
            image_data: self.data_url,
            wedding_date: wedding_date.unwrap_or_else(today),
            photographer_notes: notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }

    pub fn into_simple_request(self) -> SimpleUploadRequest {
        SimpleUploadRequest {
            filename: self.filename,
            image_data: self.data_url,
        }
    }
}

fn check_size(size: u64, max_bytes: u64) -> AppResult<()> {
    if size > max_bytes {
        return Err(AppError::InvalidUpload(format!(
            "file is {} bytes, limit is {} bytes",
            size, max_bytes
        )));
    }
    Ok(())
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Send an upload to the endpoint of `collection`. Notes only apply to the live gallery.
pub async fn upload_to(
    client: &ShowcaseClient,
    collection: Collection,
    upload: ImageUpload,
    notes: Option<String>,
) -> AppResult<UploadReceipt> {
    tracing::info!(
        collection = %collection,
        filename = %upload.filename,
        size = upload.size,
        "Uploading image"
    );

    match collection {
        Collection::GuestPhotos => {
            client
                .upload_photo(&upload.into_photo_request(notes, None))
                .await
        }
        Collection::WallPhotos => client.upload_wall_photo(&upload.into_simple_request()).await,
        Collection::BackgroundImages => {
            client
                .upload_background_image(&upload.into_simple_request())
                .await
        }
    }
}

/// Result of deleting one photo in a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub photo_id: String,
    pub error: Option<CommandError>,
}

impl DeleteResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Delete every id, continuing past failures.
pub async fn bulk_delete(
    client: &ShowcaseClient,
    collection: Collection,
    photo_ids: &[String],
) -> Vec<DeleteResult> {
    let mut results = Vec::with_capacity(photo_ids.len());

    for photo_id in photo_ids {
        let error = match client.delete_from(collection, photo_id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(collection = %collection, photo_id = %photo_id, "Delete failed: {}", e);
                Some(CommandError::from(e))
            }
        };
        results.push(DeleteResult {
            photo_id: photo_id.clone(),
            error,
        });
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    tracing::info!(
        collection = %collection,
        total = results.len(),
        failed,
        "Bulk delete finished"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path as UrlPath;
    use axum::http::StatusCode;
    use axum::routing::delete;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const WEBP_MAGIC: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[test]
    fn test_accepts_supported_formats() {
        let png = ImageUpload::from_bytes("ring.png", PNG_MAGIC, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert!(png.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));

        let jpeg = ImageUpload::from_bytes("a.jpg", JPEG_MAGIC, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");

        let webp = ImageUpload::from_bytes("a.webp", WEBP_MAGIC, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(webp.mime_type, "image/webp");
    }

    #[test]
    fn test_rejects_other_content() {
        let gif = ImageUpload::from_bytes("a.gif", b"GIF89a\x01\0\x01\0", DEFAULT_MAX_UPLOAD_BYTES);
        assert!(matches!(gif, Err(AppError::UnsupportedFormat(_))));

        let text = ImageUpload::from_bytes("notes.jpg", b"hello world", DEFAULT_MAX_UPLOAD_BYTES);
        assert!(matches!(text, Err(AppError::UnsupportedFormat(_))));

        let empty = ImageUpload::from_bytes("a.png", b"", DEFAULT_MAX_UPLOAD_BYTES);
        assert!(matches!(empty, Err(AppError::InvalidUpload(_))));
    }

    #[test]
    fn test_size_limit() {
        let result = ImageUpload::from_bytes("a.png", PNG_MAGIC, 4);
        assert!(matches!(result, Err(AppError::InvalidUpload(_))));
    }

    #[test]
    fn test_from_path_sanitizes_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("first:dance?.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let upload = ImageUpload::from_path(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert!(!upload.filename.contains(':'));
        assert!(!upload.filename.contains('?'));
        assert_eq!(upload.size, PNG_MAGIC.len());
    }

    #[test]
    fn test_photo_request_defaults() {
        let upload = ImageUpload::from_bytes("a.png", PNG_MAGIC, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        let request = upload.into_photo_request(Some("  ".into()), None);
        assert_eq!(request.photographer_notes, None);
        assert_eq!(request.wedding_date.len(), 10);
        assert_eq!(request.wedding_date, today());
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_each_id() {
        let app = Router::new().route(
            "/api/photos/:id",
            delete(|UrlPath(id): UrlPath<String>| async move {
                if id == "missing" {
                    Err((StatusCode::NOT_FOUND, Json(json!({"detail": "Photo not found"}))))
                } else {
                    Ok(Json(json!({"message": "Photo deleted successfully"})))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = ShowcaseClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        client.set_token(Some("tok".into()));

        let ids = vec!["p1".to_string(), "missing".to_string(), "p3".to_string()];
        let results = bulk_delete(&client, Collection::GuestPhotos, &ids).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(results[1].error.as_ref().unwrap().code, "E_NOT_FOUND");
        assert!(results[2].is_ok());
    }
}
