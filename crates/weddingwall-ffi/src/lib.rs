//! WeddingWall FFI - C ABI interface for native frontends.
//!
//! This crate provides a C-compatible interface to the weddingwall-core
//! library, so a native shell can drive galleries, the lightbox and the
//! photographer dashboard.
//!
//! # Usage
//!
//! 1. Call `weddingwall_init()` to create a handle
//! 2. Optionally register an event callback with `weddingwall_set_event_callback()`
//! 3. Mount galleries with `weddingwall_gallery_mount()` and drive the lightbox
//! 4. Call `weddingwall_shutdown()` to clean up
//!
//! # Error Handling
//!
//! Most functions return `0` on success, `-1` on error.
//! Call `weddingwall_last_error()` to get the error message, formatted as
//! `[E_CODE] message` for core errors.
//!
//! # Memory Management
//!
//! - Strings returned via `out_json` must be freed with `weddingwall_free_string()`
//! - The handle must be freed with `weddingwall_shutdown()`

mod callbacks;
mod error;
mod gallery;
mod handle;
mod jobs;
mod lightbox;
mod photos;
mod session;
mod settings;

use error::{clear_last_error, get_last_error_ptr, read_str, set_global_error, set_last_error};
use handle::WeddingwallHandle;
use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

// Re-export all public FFI functions
pub use callbacks::*;
pub use gallery::*;
pub use jobs::*;
pub use lightbox::*;
pub use photos::*;
pub use session::*;
pub use settings::*;

/// Initialize the WeddingWall library.
///
/// `data_dir` may be null to use the platform data directory.
///
/// # Returns
/// - Valid handle pointer on success
/// - `NULL` on error (call `weddingwall_last_error()` for details)
///
/// # Safety
/// - `data_dir` must be null or a valid null-terminated string.
/// - The returned handle must be freed with `weddingwall_shutdown()`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_init(data_dir: *const c_char) -> *mut WeddingwallHandle {
    clear_last_error();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let data_dir = if data_dir.is_null() {
            None
        } else {
            match read_str(data_dir, "data_dir") {
                Ok(dir) => Some(PathBuf::from(dir)),
                Err(msg) => {
                    set_global_error(msg);
                    return std::ptr::null_mut();
                }
            }
        };

        match WeddingwallHandle::new(data_dir) {
            Ok(handle) => {
                tracing::info!("WeddingWall FFI initialized");
                Box::into_raw(Box::new(handle))
            }
            Err(e) => {
                set_global_error(format!("initialization failed: {}", e));
                std::ptr::null_mut()
            }
        }
    }));

    result.unwrap_or_else(|_| {
        set_global_error("panic during initialization");
        std::ptr::null_mut()
    })
}

/// Shutdown the WeddingWall library and free resources.
///
/// Stops every poller and the slideshow.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init()`
/// - After calling this function, the handle is invalid
#[no_mangle]
pub unsafe extern "C" fn weddingwall_shutdown(handle: *mut WeddingwallHandle) {
    clear_last_error();

    if handle.is_null() {
        return;
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        drop(Box::from_raw(handle));
        tracing::info!("WeddingWall FFI shutdown");
    }));

    if result.is_err() {
        set_last_error("panic during shutdown");
    }
}

/// Get the last error message.
///
/// # Returns
/// - Pointer to error message (valid until next FFI call on this thread)
/// - `NULL` if no error
#[no_mangle]
pub extern "C" fn weddingwall_last_error() -> *const c_char {
    get_last_error_ptr()
}

/// Free a string allocated by the library.
///
/// # Safety
/// - `s` must be a pointer returned by a weddingwall function
/// - After calling this function, the pointer is invalid
#[no_mangle]
pub unsafe extern "C" fn weddingwall_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the library version.
///
/// # Returns
/// - Version string (must be freed with `weddingwall_free_string()`)
#[no_mangle]
pub extern "C" fn weddingwall_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .map(|cs| cs.into_raw())
        .unwrap_or(std::ptr::null_mut())
}
