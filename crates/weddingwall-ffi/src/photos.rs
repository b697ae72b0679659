//! Dashboard photo management API.

use std::ffi::c_char;
use std::path::Path;

use crate::error::{describe, guarded, read_str, write_json};
use crate::gallery::read_collection;
use crate::handle::WeddingwallHandle;
use weddingwall_core::services::{bulk_delete, upload_to, ImageUpload};

/// Upload an image file to a collection.
///
/// `notes` may be null; it only applies to the live gallery.
/// `out_json` (optional) receives the upload receipt.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `collection` and `path` must be valid null-terminated strings.
/// - `notes` must be null or a valid null-terminated string.
/// - `out_json` must be null or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_upload_file(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    path: *const c_char,
    notes: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_upload_file", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let path = read_str(path, "path")?;
        let notes = if notes.is_null() {
            None
        } else {
            Some(read_str(notes, "notes")?.to_string())
        };

        let core = &handle.core;
        let upload =
            ImageUpload::from_path(Path::new(path), core.config.max_upload_bytes).map_err(describe)?;
        let receipt = handle
            .runtime
            .block_on(upload_to(&core.client, collection, upload, notes))
            .map_err(describe)?;
        write_json(out_json, &receipt)?;
        Ok(0)
    })
}

/// Delete photos from a collection.
///
/// `ids_json` is a JSON array of photo ids. Every id is attempted;
/// `out_json` (optional) receives one result per id.
///
/// # Returns
/// - number of failed deletions (>= 0)
/// - `-1` on error
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `collection` and `ids_json` must be valid null-terminated strings.
/// - `out_json` must be null or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_delete_photos(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    ids_json: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_delete_photos", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let ids: Vec<String> = serde_json::from_str(read_str(ids_json, "ids_json")?)
            .map_err(|e| format!("invalid ids_json: {}", e))?;

        let results = handle
            .runtime
            .block_on(bulk_delete(&handle.core.client, collection, &ids));
        write_json(out_json, &results)?;
        Ok(results.iter().filter(|r| !r.is_ok()).count() as i32)
    })
}

/// List the signed-in photographer's uploads as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `out_json` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_list_own_photos_json(
    handle: *mut WeddingwallHandle,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_list_own_photos_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        if out_json.is_null() {
            return Err("out_json is null".into());
        }
        let photos = handle
            .runtime
            .block_on(handle.core.client.list_own_photos())
            .map_err(describe)?;
        write_json(out_json, &photos)?;
        Ok(0)
    })
}
