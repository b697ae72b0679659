//! Lightbox API.
//!
//! Every call takes the collection of a mounted gallery. Calls that change
//! the lightbox write the resulting state to `out_json` when it is not null
//! and also emit `lightbox:changed`.

use std::ffi::c_char;

use crate::error::{describe, guarded, read_str, write_json};
use crate::gallery::read_collection;
use crate::handle::WeddingwallHandle;
use weddingwall_core::services::{GalleryView, LightboxState, NavKey};
use weddingwall_core::AppResult;

unsafe fn transition(
    fn_name: &str,
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
    f: impl FnOnce(&GalleryView) -> AppResult<LightboxState>,
) -> i32 {
    guarded(fn_name, || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let state = handle.with_view(collection, f).map_err(describe)?;
        write_json(out_json, &state)?;
        Ok(0)
    })
}

/// Open the lightbox at `index`.
///
/// Fails with `E_NAVIGATION` when `index` is out of range.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `collection` must be a valid null-terminated string.
/// - `out_json` must be null or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_open(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    index: u32,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_open", handle, collection, out_json, |view| {
        view.open(index as usize)
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_close(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_close", handle, collection, out_json, |view| {
        Ok(view.close())
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_next(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_next", handle, collection, out_json, |view| {
        Ok(view.next())
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_prev(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_prev", handle, collection, out_json, |view| {
        Ok(view.prev())
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_jump(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    index: u32,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_jump", handle, collection, out_json, |view| {
        view.jump(index as usize)
    })
}

/// Feed a key press (`Escape`, `ArrowLeft`, `ArrowRight`; others are ignored).
///
/// # Safety
/// See `weddingwall_lightbox_open`; `key` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_key(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    key: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_lightbox_key", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let key = NavKey::from_key_name(read_str(key, "key")?);
        let state = handle
            .with_view(collection, |view| Ok(view.handle_key(key)))
            .map_err(describe)?;
        write_json(out_json, &state)?;
        Ok(0)
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_touch_start(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    x: f32,
    y: f32,
) -> i32 {
    transition(
        "weddingwall_lightbox_touch_start",
        handle,
        collection,
        std::ptr::null_mut(),
        |view| {
            view.touch_start(x, y);
            Ok(view.lightbox_state())
        },
    )
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_touch_end(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    x: f32,
    y: f32,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_touch_end", handle, collection, out_json, |view| {
        Ok(view.touch_end(x, y))
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_drag_move(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    dx: f32,
) -> i32 {
    transition(
        "weddingwall_lightbox_drag_move",
        handle,
        collection,
        std::ptr::null_mut(),
        |view| {
            view.drag_move(dx);
            Ok(view.lightbox_state())
        },
    )
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_drag_end(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_drag_end", handle, collection, out_json, |view| {
        Ok(view.drag_end())
    })
}

/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_state_json(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    transition("weddingwall_lightbox_state_json", handle, collection, out_json, |view| {
        Ok(view.lightbox_state())
    })
}

/// Photo shown in the lightbox as JSON, or `null` when closed.
///
/// # Safety
/// See `weddingwall_lightbox_open`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_lightbox_current_photo_json(
    handle: *mut WeddingwallHandle,
    collection: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_lightbox_current_photo_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let collection = read_collection(collection)?;
        let photo = handle
            .with_view(collection, |view| Ok(view.current_photo()))
            .map_err(describe)?;
        write_json(out_json, &photo)?;
        Ok(0)
    })
}
