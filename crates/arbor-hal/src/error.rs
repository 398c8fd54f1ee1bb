//! Error types shared by the job core and its collaborators.
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `AlreadySubmitted` | job handle | `submit()` called twice |
//! | `Translation` | translator | malformed input program |
//! | `RemoteExecution` | resource | resource-side failure |
//! | `Protocol` | execution unit | response of the wrong shape |
//! | `Timeout` | job handle | result requested before completion |
//! | `Cancelled` | job handle | task dropped before it finished |
//! | `ExperimentNotFound` | job result | lookup by unknown name |
//! | `InvalidJob` | job handle | empty or inconsistent submission |
//! | `Configuration` | config loader | bad settings |
//!
//! Errors are `Clone`: one failed task is reported to every caller that
//! waits on the job.

use arbor_ir::IrError;
use thiserror::Error;

/// Errors that can occur while executing jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The job handle was already submitted.
    #[error("Job {0} has already been submitted")]
    AlreadySubmitted(String),

    /// The experiment could not be translated into a program.
    #[error("Translation failed: {0}")]
    Translation(String),

    /// The execution resource reported a failure.
    #[error("Remote execution failed: {0}")]
    RemoteExecution(String),

    /// The execution resource answered with a malformed response.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The job did not finish within the requested time.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// A task was abandoned before it produced a result.
    #[error("Task cancelled: {0}")]
    Cancelled(String),

    /// No experiment with this name exists in the result.
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// The job description cannot be executed.
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<IrError> for HalError {
    fn from(e: IrError) -> Self {
        HalError::Translation(e.to_string())
    }
}

/// Result type for job operations.
pub type HalResult<T> = Result<T, HalError>;
