//! Dashboard photo commands

use std::path::Path;

use weddingwall_core::models::{PhotoSummary, UploadReceipt};
use weddingwall_core::services::{bulk_delete, upload_to, DeleteResult, ImageUpload};
use weddingwall_core::{AppError, Collection, CommandError};

use crate::AppState;

/// Validate an image file and upload it to `collection`.
pub async fn upload_photo(
    state: &AppState,
    path: &Path,
    collection: Collection,
    notes: Option<String>,
) -> Result<UploadReceipt, CommandError> {
    let core = &state.core;
    let upload = ImageUpload::from_path(path, core.config.max_upload_bytes)?;
    let receipt = upload_to(&core.client, collection, upload, notes).await?;

    // Show the new photo without waiting for the next poll.
    core.engine(collection).refresh().await;
    Ok(receipt)
}

/// Delete several photos; one failure does not stop the rest.
pub async fn delete_photos(
    state: &AppState,
    photo_ids: &[String],
    collection: Collection,
) -> Result<Vec<DeleteResult>, CommandError> {
    if !state.core.client.has_token() {
        return Err(AppError::Unauthorized.into());
    }

    let results = bulk_delete(&state.core.client, collection, photo_ids).await;
    if results.iter().any(DeleteResult::is_ok) {
        state.core.engine(collection).refresh().await;
    }
    Ok(results)
}

/// Photos uploaded by the signed-in photographer.
pub async fn list_own_photos(state: &AppState) -> Result<Vec<PhotoSummary>, CommandError> {
    Ok(state.core.client.list_own_photos().await?)
}

pub fn format_summary(photo: &PhotoSummary) -> String {
    let mut line = photo.photo_id.clone();
    if let Some(filename) = &photo.filename {
        line.push_str(&format!("  {}", filename));
    }
    if let Some(date) = &photo.wedding_date {
        line.push_str(&format!("  ({})", date));
    }
    if let Some(notes) = &photo.photographer_notes {
        line.push_str(&format!("  \"{}\"", notes));
    }
    line
}
