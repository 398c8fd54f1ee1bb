//! The job handle capability surface.
//!
//! ```text
//!   submit() ──→ status() ──→ wait() ──→ result()
//!   (once)       (any time)   (timeout)   (memoized)
//! ```
//!
//! | Method | Kind | Returns |
//! |--------|------|---------|
//! | `job_id()` | sync | `&JobId` |
//! | `submit()` | async | `HalResult<()>` |
//! | `status()` | sync | `JobStatus` |
//! | `wait()` | async | `HalResult<()>` |
//! | `result()` | async | `HalResult<Arc<JobResult>>` |
//! | `cancel()` | async | `HalResult<()>` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::HalResult;
use crate::job::{JobId, JobStatus};
use crate::result::JobResult;

/// A submitted (or submittable) job.
///
/// # Contract
///
/// - `submit()` fails with `AlreadySubmitted` on a second call and never
///   blocks on execution.
/// - `status()` is computed from live task state.
/// - `wait()` returns `Ok(())` when the timeout elapses; callers re-check
///   `status()`. Once every task is terminal it assembles the result once
///   and surfaces the first task error.
/// - `result()` returns the same `Arc` on every call after completion.
/// - `cancel()` is accepted and does not stop dispatched tasks.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Identifier of this job.
    fn job_id(&self) -> &JobId;

    /// Dispatch every experiment to the worker pool.
    async fn submit(&self) -> HalResult<()>;

    /// Current job status.
    fn status(&self) -> JobStatus;

    /// Wait for all tasks to finish, or for `timeout` to elapse.
    async fn wait(&self, timeout: Option<Duration>) -> HalResult<()>;

    /// Wait, then return the assembled result. Fails with `Timeout` if
    /// the job is still running when `timeout` elapses.
    async fn result(&self, timeout: Option<Duration>) -> HalResult<Arc<JobResult>>;

    /// Request cancellation.
    async fn cancel(&self) -> HalResult<()>;
}
