//! Photographer session API.

use std::ffi::c_char;

use crate::error::{describe, guarded, read_str, write_json};
use crate::handle::WeddingwallHandle;
use weddingwall_core::services::parse_callback_fragment;

/// Sign in with the identity provider callback.
///
/// `callback` may be the full redirect URL, its `#session_id=...` fragment,
/// or the bare session id. `out_json` (optional) receives the user profile.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `callback` must be a valid null-terminated string.
/// - `out_json` must be null or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_login(
    handle: *mut WeddingwallHandle,
    callback: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_login", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let callback = read_str(callback, "callback")?;

        let session_id = if callback.contains('=') {
            parse_callback_fragment(callback).ok_or("callback has no session_id")?
        } else {
            callback.trim().to_string()
        };

        let core = &handle.core;
        let user = handle
            .runtime
            .block_on(core.sessions.exchange(&core.client, &session_id))
            .map_err(describe)?;
        write_json(out_json, &user)?;
        Ok(0)
    })
}

/// Sign out. The local session is cleared even when the backend is down.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_logout(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_logout", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let core = &handle.core;
        handle
            .runtime
            .block_on(core.sessions.logout(&core.client))
            .map_err(describe)?;
        Ok(0)
    })
}

/// Current user as JSON, verified against the backend.
///
/// Fails with `E_UNAUTHORIZED` when signed out or the session was rejected.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `out_json` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_user_json(
    handle: *mut WeddingwallHandle,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_user_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        if out_json.is_null() {
            return Err("out_json is null".into());
        }
        let core = &handle.core;
        let user = handle
            .runtime
            .block_on(core.sessions.verify(&core.client))
            .map_err(describe)?;
        write_json(out_json, &user)?;
        Ok(0)
    })
}

/// # Returns
/// - `1` if a session token is held
/// - `0` if not
/// - `-1` on error
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_is_signed_in(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_is_signed_in", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        Ok(handle.core.client.has_token() as i32)
    })
}
