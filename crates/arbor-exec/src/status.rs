//! Job status aggregation.

use arbor_hal::JobStatus;

/// Rank of a task state in the aggregation; higher wins.
fn priority(status: JobStatus) -> u8 {
    match status {
        JobStatus::Error => 5,
        JobStatus::Running => 4,
        JobStatus::Cancelled => 3,
        JobStatus::Done => 2,
        JobStatus::Queued => 1,
        JobStatus::Initializing => 0,
    }
}

/// Derive one job status from its task states.
///
/// Priority, highest first: `Error`, `Running`, `Cancelled`, `Done`,
/// `Queued`, `Initializing`. A failure anywhere marks the job failed even
/// while other tasks run; a running task outranks finished ones. With no
/// tasks the job is `Initializing`.
pub fn aggregate<I>(states: I) -> JobStatus
where
    I: IntoIterator<Item = JobStatus>,
{
    states
        .into_iter()
        .max_by_key(|s| priority(*s))
        .unwrap_or(JobStatus::Initializing)
}
