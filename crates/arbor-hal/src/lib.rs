//! Arbor job model and collaborator contracts.
//!
//! This crate holds what the execution core and its collaborators agree
//! on:
//! - the inbound job description ([`JobSpec`], [`Experiment`])
//! - job identity and the task state machine ([`JobId`], [`JobStatus`])
//! - result envelopes ([`JobResult`], [`ExperimentResult`], [`Counts`])
//! - the [`Translator`] and [`RemoteResource`] collaborator traits
//! - the [`JobHandle`] trait implemented by the scheduler
//! - the shared error type [`HalError`]
//!
//! # Example: Describing a Job
//!
//! ```
//! use arbor_hal::{Experiment, ExperimentInstruction, JobSpec};
//!
//! let bell = Experiment::new("Bell", 2, [("c", 2)])
//!     .push(ExperimentInstruction::gate("h", [0]))
//!     .push(ExperimentInstruction::gate("cx", [0, 1]))
//!     .push(ExperimentInstruction::measure(0, 0))
//!     .push(ExperimentInstruction::measure(1, 1));
//!
//! let spec = JobSpec::new(vec![bell], 256).with_seed(42);
//! assert_eq!(spec.experiments[0].name(), "Bell");
//! ```

pub mod error;
pub mod experiment;
pub mod handle;
pub mod job;
pub mod resource;
pub mod result;
pub mod translator;

pub use error::{HalError, HalResult};
pub use experiment::{
    DEFAULT_SHOTS, Experiment, ExperimentHeader, ExperimentInstruction, InstructionCondition,
    JobConfig, JobSpec,
};
pub use handle::JobHandle;
pub use job::{Job, JobId, JobStatus, ResourceTarget};
pub use resource::{RawShot, RemoteResource};
pub use result::{Counts, ExperimentResult, JobResult, StateVector};
pub use translator::Translator;
