//! Bounded execution slots.

use std::sync::{Arc, OnceLock};

use arbor_hal::{HalError, HalResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Permits held by the process-wide limiter unless configured otherwise.
pub const DEFAULT_PERMITS: usize = 1;

static GLOBAL: OnceLock<ResourceLimiter> = OnceLock::new();

/// Bounds how many experiments execute at once.
///
/// Cloning shares the underlying semaphore. [`ResourceLimiter::global`]
/// is the process-wide instance every scheduler uses by default; tests and
/// resources that tolerate concurrency inject their own.
#[derive(Debug, Clone)]
pub struct ResourceLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ResourceLimiter {
    /// Create a limiter with `permits` slots (at least one).
    pub fn new(permits: usize) -> Self {
        let capacity = permits.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// The process-wide limiter, created on first use with
    /// [`DEFAULT_PERMITS`] unless [`ResourceLimiter::init_global`] ran first.
    pub fn global() -> Self {
        GLOBAL.get_or_init(|| Self::new(DEFAULT_PERMITS)).clone()
    }

    /// Size the process-wide limiter. Returns `false` if it already
    /// exists, in which case its size is unchanged.
    pub fn init_global(permits: usize) -> bool {
        let installed = GLOBAL.set(Self::new(permits)).is_ok();
        if !installed {
            debug!("Global limiter already initialized; keeping existing size");
        }
        installed
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> HalResult<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| HalError::RemoteExecution("execution limiter closed".into()))
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for ResourceLimiter {
    fn default() -> Self {
        Self::global()
    }
}
