//! Gallery and slideshow API.
//!
//! Collections are named `guest`, `wall` or `background`.

use std::ffi::c_char;

use crate::error::{describe, guarded, read_str, write_json};
use crate::handle::WeddingwallHandle;
use weddingwall_core::Collection;

/// Parse a collection name argument.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
pub(crate) unsafe fn read_collection(ptr: *const c_char) -> Result<Collection, String> {
    read_str(ptr, "collection")?
        .parse::<Collection>()
        .map_err(describe)
}

/// Mount a gallery: serve cached photos, start polling, track the lightbox.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `collection` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_gallery_mount(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
) -> i32 {
    guarded("weddingwall_gallery_mount", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        handle.mount(collection);
        Ok(0)
    })
}

/// Unmount a gallery, stopping its poller and closing its lightbox.
///
/// # Returns
/// - `1` if the gallery was mounted
/// - `0` if it was not
/// - `-1` on error
///
/// # Safety
/// See `weddingwall_gallery_mount`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_gallery_unmount(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
) -> i32 {
    guarded("weddingwall_gallery_unmount", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        Ok(handle.unmount(collection) as i32)
    })
}

/// Current gallery state (photos, status, last fetch) as JSON.
///
/// Works for unmounted collections too; their engine is created on demand.
///
/// # Safety
/// - `out_json` must be a valid pointer; the string must be freed with
///   `weddingwall_free_string`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_gallery_state_json(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_gallery_state_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        if out_json.is_null() {
            return Err("out_json is null".into());
        }
        let collection = read_collection(collection)?;
        let state = handle.core.engine(collection).state();
        write_json(out_json, &state)?;
        Ok(0)
    })
}

/// Refresh a gallery now, blocking until the fetch completes or times out.
///
/// `out_json` (optional) receives the refresh outcome.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `out_json` must be null or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_gallery_refresh(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_gallery_refresh", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let engine = handle.core.engine(collection);
        let outcome = handle.runtime.block_on(engine.refresh());
        write_json(out_json, &outcome)?;
        Ok(0)
    })
}

/// Start rotating the header background images.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_slideshow_start(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_slideshow_start", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        handle.start_slideshow();
        Ok(0)
    })
}

/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_slideshow_stop(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_slideshow_stop", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        handle.stop_slideshow();
        Ok(0)
    })
}

/// Index of the background image currently shown.
///
/// # Returns
/// - index (>= 0)
/// - `-1` on error or if the slideshow is not running
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_slideshow_index(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_slideshow_index", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let slideshow = handle.slideshow.lock();
        let ticker = slideshow.as_ref().ok_or("slideshow is not running")?;
        Ok(ticker.index() as i32)
    })
}
