//! Gallery commands

use weddingwall_core::{Collection, CommandError, GalleryState, RefreshOutcome};

use crate::AppState;

/// Current gallery state, served from the cache when nothing was fetched yet.
pub fn get_gallery(state: &AppState, collection: Collection) -> Result<GalleryState, CommandError> {
    Ok(state.core.engine(collection).initialize())
}

/// Fetch a collection once and report what changed.
pub async fn refresh_gallery(
    state: &AppState,
    collection: Collection,
) -> Result<(RefreshOutcome, GalleryState), CommandError> {
    let engine = state.core.engine(collection);
    engine.initialize();
    let outcome = engine.refresh().await;
    Ok((outcome, engine.state()))
}

/// One line per photo: index, id and caption.
pub fn format_gallery(state: &GalleryState) -> String {
    let mut out = format!(
        "{} ({:?}, {} photos)",
        state.collection,
        state.sync_status,
        state.len()
    );
    for (index, photo) in state.photos.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", index, photo.id));
        if let Some(caption) = photo.display_caption() {
            out.push_str(&format!("  {}", caption));
        }
    }
    out
}
