//! Background job API.

use crate::error::guarded;
use crate::handle::WeddingwallHandle;

/// Number of running background tasks (pollers, slideshow).
///
/// # Returns
/// - Number of active jobs (>= 0)
/// - `-1` on error
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_get_active_job_count(handle: *mut WeddingwallHandle) -> i32 {
    guarded("weddingwall_get_active_job_count", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        Ok(handle.core.jobs().active_job_count() as i32)
    })
}

/// Cancel one background task.
///
/// # Returns
/// - `1` if the job was cancelled
/// - `0` if no such job
/// - `-1` on error
///
/// # Safety
/// - `handle` must be a valid pointer from `weddingwall_init`.
#[no_mangle]
pub unsafe extern "C" fn weddingwall_cancel_job(handle: *mut WeddingwallHandle, job_id: u64) -> i32 {
    guarded("weddingwall_cancel_job", || {
        let handle = handle.as_ref().ok_or("handle is null")?;
        Ok(handle.core.jobs().cancel_job(job_id) as i32)
    })
}
