//! Event callback registration API.

use crate::error::guarded;
use crate::handle::{EventCallback, WeddingwallHandle};
use std::ffi::c_void;

/// Register an event callback.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `callback` must be a valid function pointer.
/// - `user_data` must remain valid for the lifetime of the callback registration.
///
/// # Returns
/// - `0` on success
/// - `-1` on error (call `weddingwall_last_error` for details)
#[no_mangle]
pub unsafe extern "C" fn weddingwall_set_event_callback(
    handle: *mut WeddingwallHandle,
    callback: EventCallback,
    user_data: *mut c_void,
) -> i32 {
    guarded("weddingwall_set_event_callback", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        handle.event_sink.set_callback(callback, user_data);
        tracing::debug!("Event callback registered");
        Ok(0)
    })
}

/// Clear the event callback.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_clear_event_callback(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_clear_event_callback", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        handle.event_sink.clear_callback();
        tracing::debug!("Event callback cleared");
        Ok(0)
    })
}
