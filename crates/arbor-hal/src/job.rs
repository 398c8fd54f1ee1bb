//! Job and task lifecycle types.
//!
//! Every experiment of a job runs as one task. Tasks move through:
//!
//! ```text
//!   Initializing ──→ Queued ──→ Running ──→ Done
//!                      │           │
//!                      │           ├──→ Error
//!                      │           │
//!                      └───────────┴──→ Cancelled
//! ```
//!
//! The job-level status is derived from the task states (see the
//! aggregation in `arbor-exec`) and uses the same enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::experiment::JobSpec;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random (UUID v4) job ID.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a task, or of a whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Created but not yet handed to the worker pool.
    Initializing,
    /// Waiting for an execution slot.
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Error,
    /// Abandoned before it could finish.
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Error | JobStatus::Cancelled
        )
    }

    /// Check if the task is still pending.
    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    /// Check if the task completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Done)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Initializing => write!(f, "Initializing"),
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Done => write!(f, "Done"),
            JobStatus::Error => write!(f, "Error"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Where and how a job should run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceTarget {
    /// Lattice or resource name; `None` lets the resource pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lattice: Option<String>,
    /// Run on a local emulated instance rather than real hardware.
    #[serde(default)]
    pub as_emulator: bool,
}

impl ResourceTarget {
    /// Target a named lattice.
    pub fn lattice(name: impl Into<String>) -> Self {
        Self {
            lattice: Some(name.into()),
            as_emulator: false,
        }
    }

    /// Mark the target as emulated.
    #[must_use]
    pub fn emulated(mut self) -> Self {
        self.as_emulator = true;
        self
    }
}

/// A submitted unit of work: the batch plus where it runs.
///
/// Immutable once created; the scheduler hands each task its own copy of
/// the experiment it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// The job identifier.
    pub id: JobId,
    /// The experiments and run configuration.
    pub spec: JobSpec,
    /// Execution target.
    pub target: ResourceTarget,
    /// Time the job was created.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job.
    pub fn new(id: impl Into<JobId>, spec: JobSpec, target: ResourceTarget) -> Self {
        Self {
            id: id.into(),
            spec,
            target,
            created_at: Utc::now(),
        }
    }

    /// Number of experiments in the job.
    pub fn num_experiments(&self) -> usize {
        self.spec.experiments.len()
    }

    /// Shots requested per experiment.
    pub fn shots(&self) -> u32 {
        self.spec.config.shots
    }

    /// Sampling seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.spec.config.seed_simulator
    }
}
