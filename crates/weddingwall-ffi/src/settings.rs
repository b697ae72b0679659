//! Settings API.
//!
//! Two kinds of settings: the local client configuration (`client.json`)
//! and the site settings stored by the backend (contact links, couple names).

use std::ffi::c_char;

use crate::error::{describe, guarded, read_str, write_json};
use crate::handle::WeddingwallHandle;
use weddingwall_core::events::{EventSinkExt, SETTINGS_CHANGED};
use weddingwall_core::{AppError, ClientConfig, ConfigManager, SiteSettings};

/// Get the client configuration as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `out_json` must be a valid pointer; free the string with `weddingwall_free_string`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_get_config_json(
    handle: *mut WeddingwallHandle,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_get_config_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        if out_json.is_null() {
            return Err("out_json is null".into());
        }
        let config = ConfigManager::new(handle.core.paths().as_ref())
            .and_then(|manager| manager.load())
            .map_err(describe)?;
        write_json(out_json, &config)?;
        Ok(0)
    })
}

/// Save the client configuration from JSON.
///
/// Takes effect on the next `weddingwall_init`.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `config_json` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_save_config_json(
    handle: *mut WeddingwallHandle,
    config_json: *const c_char,
) -> i32 {
    guarded("weddingwall_save_config_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let json = read_str(config_json, "config_json")?;

        let config: ClientConfig = serde_json::from_str(json)
            .map_err(|e| describe(AppError::Config(format!("invalid config JSON: {}", e))))?;

        ConfigManager::new(handle.core.paths().as_ref())
            .and_then(|manager| manager.save(&config))
            .map_err(describe)?;

        handle.core.events().emit_typed(SETTINGS_CHANGED, &config);
        Ok(0)
    })
}

/// Fetch the site settings with display defaults applied.
///
/// # Safety
/// See `weddingwall_get_config_json`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_get_site_settings_json(
    handle: *mut WeddingwallHandle,
    out_json: *mut *mut c_char,
) -> i32 {
    guarded("weddingwall_get_site_settings_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        if out_json.is_null() {
            return Err("out_json is null".into());
        }
        let settings = handle
            .runtime
            .block_on(handle.core.client.get_settings())
            .map_err(describe)?;
        write_json(out_json, &settings.resolved())?;
        Ok(0)
    })
}

/// Save the site settings. Requires a signed-in photographer.
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
/// - `settings_json` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_save_site_settings_json(
    handle: *mut WeddingwallHandle,
    settings_json: *const c_char,
) -> i32 {
    guarded("weddingwall_save_site_settings_json", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        let json = read_str(settings_json, "settings_json")?;

        let settings: SiteSettings = serde_json::from_str(json)
            .map_err(|e| describe(AppError::Config(format!("invalid settings JSON: {}", e))))?;

        handle
            .runtime
            .block_on(handle.core.client.save_settings(&settings))
            .map_err(describe)?;

        handle
            .core
            .events()
            .emit_typed(SETTINGS_CHANGED, &settings.resolved());
        Ok(0)
    })
}
