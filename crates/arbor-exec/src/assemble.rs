//! Job result assembly.

use arbor_hal::{ExperimentResult, HalError, HalResult, Job, JobResult};
use chrono::Utc;
use tracing::{info, warn};

/// Status string of an assembled result.
pub const COMPLETED: &str = "COMPLETED";

/// Backend identity stamped onto assembled results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Backend version.
    pub version: String,
}

impl BackendInfo {
    /// Create backend info.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Outcome of one task, `None` if it never reported one.
pub type TaskOutcome = Option<HalResult<ExperimentResult>>;

/// Build the job result from task outcomes in submission order.
///
/// Fails with the first error in submission order; a task without an
/// outcome counts as cancelled.
pub fn assemble(
    job: &Job,
    backend: &BackendInfo,
    outcomes: Vec<TaskOutcome>,
    time_taken: f64,
) -> HalResult<JobResult> {
    let mut results = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Some(Ok(result)) => results.push(result),
            Some(Err(e)) => {
                warn!(job_id = %job.id, index, error = %e, "Job failed");
                return Err(e);
            }
            None => {
                let name = job
                    .spec
                    .experiments
                    .get(index)
                    .map_or("?", |e| e.name());
                return Err(HalError::Cancelled(format!(
                    "experiment {index} ('{name}') of job {}",
                    job.id
                )));
            }
        }
    }

    info!(
        job_id = %job.id,
        experiments = results.len(),
        time_taken,
        "Assembled job result"
    );

    Ok(JobResult {
        success: results.iter().all(|r| r.success),
        job_id: job.id.clone(),
        qobj_id: job.spec.qobj_id.clone(),
        backend_name: backend.name.clone(),
        backend_version: backend.version.clone(),
        header: job.spec.header.clone(),
        results,
        status: COMPLETED.to_string(),
        date: Utc::now(),
        time_taken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_hal::{Counts, Experiment, JobSpec, ResourceTarget};

    fn job(names: &[&'static str]) -> Job {
        let experiments = names
            .iter()
            .map(|n| Experiment::new(*n, 1, [("c", 1)]))
            .collect();
        Job::new(
            "job-7",
            JobSpec::new(experiments, 10).with_qobj_id("q-7"),
            ResourceTarget::default(),
        )
    }

    fn ok(name: &str) -> TaskOutcome {
        Some(Ok(ExperimentResult::new(
            arbor_hal::ExperimentHeader::named(name),
            10,
            Counts::from_pairs([("0x0", 10)]),
        )))
    }

    fn backend() -> BackendInfo {
        BackendInfo::new("Forest", "0.0.1")
    }

    #[test]
    fn test_assemble_preserves_order() {
        let result = assemble(
            &job(&["a", "b", "c"]),
            &backend(),
            vec![ok("a"), ok("b"), ok("c")],
            1.5,
        )
        .unwrap();
        assert_eq!(result.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(result.success);
        assert_eq!(result.status, COMPLETED);
        assert_eq!(result.qobj_id, "q-7");
        assert_eq!(result.backend_name, "Forest");
        assert_eq!(result.time_taken, 1.5);
    }

    #[test]
    fn test_first_error_wins() {
        let outcomes = vec![
            ok("a"),
            Some(Err(HalError::RemoteExecution("first".into()))),
            Some(Err(HalError::Protocol("second".into()))),
        ];
        let err = assemble(&job(&["a", "b", "c"]), &backend(), outcomes, 0.0).unwrap_err();
        assert_eq!(err, HalError::RemoteExecution("first".into()));
    }

    #[test]
    fn test_missing_outcome_is_cancelled() {
        let err = assemble(&job(&["a", "b"]), &backend(), vec![ok("a"), None], 0.0).unwrap_err();
        assert!(matches!(err, HalError::Cancelled(msg) if msg.contains("'b'")));
    }
}
