//! Arbor execution core.
//!
//! Runs every experiment of a job as an independent task on a bounded pool
//! of execution slots and presents the job as one unit:
//!
//! - [`ExecutionUnit`]: translate, run, and count one experiment
//! - [`ResourceLimiter`]: caps concurrent use of the execution resource
//! - [`JobScheduler`] / [`ScheduledJob`]: fan-out, status, wait, result
//! - [`aggregate`]: derives a job status from task states
//! - [`assemble`]: builds the [`JobResult`](arbor_hal::JobResult)
//! - [`LatticeBackend`]: the backend facade
//!
//! # Example
//!
//! ```
//! use arbor_exec::{ResourceLimiter, get_backend};
//! use arbor_hal::{Experiment, ExperimentInstruction, JobHandle, JobSpec, JobStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> arbor_hal::HalResult<()> {
//! let bell = Experiment::new("Bell", 2, [("c", 2)])
//!     .push(ExperimentInstruction::gate("h", [0]))
//!     .push(ExperimentInstruction::gate("cx", [0, 1]))
//!     .push(ExperimentInstruction::measure(0, 0))
//!     .push(ExperimentInstruction::measure(1, 1));
//!
//! let backend = get_backend(None, false).with_limiter(ResourceLimiter::new(1));
//! let job = backend.run(JobSpec::new(vec![bell], 128).with_seed(7)).await?;
//! let result = job.result(None).await?;
//!
//! assert_eq!(job.status(), JobStatus::Done);
//! let counts = result.counts("Bell")?;
//! assert_eq!(counts.get("0x0") + counts.get("0x3"), 128);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod backend;
pub mod config;
pub mod limiter;
pub mod scheduler;
pub mod status;
pub mod unit;

pub use arbor_ir::STATEVECTOR_RESOURCE;
pub use assemble::{BackendInfo, COMPLETED, TaskOutcome, assemble};
pub use backend::{
    BACKEND_NAME, BACKEND_VERSION, BASIS_GATES, BackendConfiguration, LatticeBackend, get_backend,
};
pub use config::{ConfigError, ExecConfig, LoggingConfig};
pub use limiter::{DEFAULT_PERMITS, ResourceLimiter};
pub use scheduler::{JobScheduler, ScheduledJob};
pub use status::aggregate;
pub use unit::{ExecutionUnit, hex_label};
