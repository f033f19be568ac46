//! Admission gate for outbound requests
//!
//! Caps how many provider calls run at the same time. Ordering between
//! callers is left to the rate limiter; this only bounds concurrency.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bounded-concurrency request queue
#[derive(Debug, Clone)]
pub struct RequestQueue {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl RequestQueue {
    /// Create a queue admitting `max_concurrent` tasks at once (at least one)
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Run `task` once a slot is free.
    ///
    /// The slot is released when the task finishes, whether it succeeded,
    /// failed, or the caller stopped waiting on it.
    pub async fn enqueue<F, Fut, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::QueueClosed)?;
        task().await
    }

    /// Number of tasks currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.permits.available_permits()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
