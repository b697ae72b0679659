//! Background task tracking and cancellation.
//!
//! Pollers, lightbox watchers and slideshow tickers each hold a
//! [`CancelToken`]. The [`JobManager`] keeps the tokens of every running task
//! so a shutdown can cancel all of them at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

/// Unique identifier for a job.
pub type JobId = u64;

/// Token for checking and signaling task cancellation.
///
/// Clone this token to share cancellation state across tasks.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
    job_id: JobId,
}

impl CancelToken {
    /// Create a new cancel token for the given job ID.
    pub fn new(job_id: JobId) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
            job_id,
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation and wake every task waiting in [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Get the job ID associated with this token.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }
}

/// Manager for tracking and cancelling background tasks.
#[derive(Debug, Default)]
pub struct JobManager {
    next_id: AtomicU64,
    jobs: RwLock<HashMap<JobId, CancelToken>>,
}

impl JobManager {
    /// Create a new job manager.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new job and return its cancel token.
    pub fn start_job(&self) -> CancelToken {
        let job_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::new(job_id);

        if let Ok(mut jobs) = self.jobs.write() {
            jobs.insert(job_id, token.clone());
        }

        token
    }

    /// Cancel a job by its ID.
    ///
    /// Returns true if the job was found and cancelled.
    pub fn cancel_job(&self, job_id: JobId) -> bool {
        if let Ok(jobs) = self.jobs.read() {
            if let Some(token) = jobs.get(&job_id) {
                token.cancel();
                return true;
            }
        }
        false
    }

    /// Cancel all running jobs.
    pub fn cancel_all(&self) {
        if let Ok(jobs) = self.jobs.read() {
            for token in jobs.values() {
                token.cancel();
            }
        }
    }

    /// Remove a finished job from tracking.
    pub fn complete_job(&self, job_id: JobId) {
        if let Ok(mut jobs) = self.jobs.write() {
            jobs.remove(&job_id);
        }
    }

    /// Get the number of active jobs.
    pub fn active_job_count(&self) -> usize {
        self.jobs.read().map(|j| j.len()).unwrap_or(0)
    }

    /// Check if a specific job is still active.
    pub fn is_job_active(&self, job_id: JobId) -> bool {
        self.jobs
            .read()
            .map(|j| j.contains_key(&job_id))
            .unwrap_or(false)
    }
}
