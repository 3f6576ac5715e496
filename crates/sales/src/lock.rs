//! Process-wide mutual exclusion for sale processing and cache writes.
//!
//! Sale processing and stock-cache writers share one lock domain so a
//! manual rebuild can never race an in-flight sale's decrement phase.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Bounded-wait mutual exclusion primitive.
#[async_trait]
pub trait ProcessLock: Send + Sync {
    /// Attempts to take the lock, waiting up to `timeout`. Returns false
    /// when the wait expires without acquisition.
    async fn try_acquire(&self, timeout: Duration) -> bool;

    /// Returns the lock. Must be called exactly once per successful
    /// acquisition; [`LockGuard`] enforces this.
    fn release(&self);
}

/// Single-permit semaphore lock.
#[derive(Debug)]
pub struct SemaphoreLock {
    permits: Semaphore,
}

impl SemaphoreLock {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(1),
        }
    }
}

impl Default for SemaphoreLock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessLock for SemaphoreLock {
    async fn try_acquire(&self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => {
                permit.forget();
                true
            }
            // The semaphore is never closed; a timeout is the only miss.
            _ => false,
        }
    }

    fn release(&self) {
        self.permits.add_permits(1);
    }
}

/// Releases the lock when dropped, so no early return can skip it.
pub struct LockGuard {
    lock: Arc<dyn ProcessLock>,
}

impl LockGuard {
    /// Acquires the lock with a bounded wait, returning a releasing guard,
    /// or `None` on timeout.
    pub async fn acquire(lock: Arc<dyn ProcessLock>, timeout: Duration) -> Option<Self> {
        if lock.try_acquire(timeout).await {
            Some(Self { lock })
        } else {
            None
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
