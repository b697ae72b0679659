//! Thread-local error handling for FFI.
//!
//! Uses the "last error" pattern common in C APIs.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use weddingwall_core::{AppError, CommandError};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread.
pub fn set_last_error(msg: impl Into<String>) {
    let msg = msg.into();
    tracing::error!("FFI error: {}", msg);
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error for the current thread.
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Pointer to the last error message, falling back to the global error.
/// Returns null if neither is set.
pub fn get_last_error_ptr() -> *const c_char {
    let local = LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(std::ptr::null())
    });
    if !local.is_null() {
        return local;
    }
    GLOBAL_ERROR
        .read()
        .as_ref()
        .map(|s| s.as_ptr())
        .unwrap_or(std::ptr::null())
}

/// Global error for cross-thread scenarios (e.g., init failures).
static GLOBAL_ERROR: RwLock<Option<CString>> = RwLock::new(None);

pub fn set_global_error(msg: impl Into<String>) {
    let msg = msg.into();
    tracing::error!("FFI global error: {}", msg);
    *GLOBAL_ERROR.write() = CString::new(msg).ok();
}

/// Format a core error as `[E_CODE] message`.
pub fn describe(err: AppError) -> String {
    CommandError::from(err).to_string()
}

/// Run an FFI body: clear the last error, catch panics, map `Err` to `-1`.
pub fn guarded<F>(fn_name: &str, body: F) -> i32
where
    F: FnOnce() -> Result<i32, String>,
{
    clear_last_error();

    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(code)) => code,
        Ok(Err(msg)) => {
            set_last_error(msg);
            -1
        }
        Err(_) => {
            set_last_error(format!("panic in {}", fn_name));
            -1
        }
    }
}

/// Borrow a C string argument as UTF-8.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
pub unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{} is null", what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("invalid UTF-8 in {}", what))
}

pub fn string_to_cstr(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Serialize `value` into `out_json` when the caller asked for it.
///
/// # Safety
/// `out_json` must be null or a valid pointer to writable storage.
pub unsafe fn write_json<T: serde::Serialize>(out_json: *mut *mut c_char, value: &T) -> Result<(), String> {
    if out_json.is_null() {
        return Ok(());
    }
    let json = serde_json::to_string(value).map_err(|e| format!("serialize failed: {}", e))?;
    *out_json = string_to_cstr(&json);
    Ok(())
}
