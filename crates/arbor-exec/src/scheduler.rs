//! Job scheduling.
//!
//! A [`JobScheduler`] turns a [`Job`] into a [`ScheduledJob`] handle.
//! Submitting the handle spawns one task per experiment; each task waits
//! for a slot on the shared [`ResourceLimiter`], runs its experiment
//! through the [`ExecutionUnit`], and publishes its outcome into its own
//! slot. The handle derives job status from the slots on demand and
//! assembles the result once every task has finished.
//!
//! ```text
//!   submit() ──→ spawn N tasks ──→ [limiter] ──→ ExecutionUnit ──→ slot
//!                                                                    │
//!   wait() ◀── finished counter ◀─────────────────────────────────────┘
//!     │
//!     └──→ assemble (once) ──→ result()
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use arbor_hal::{
    Experiment, ExperimentResult, HalError, HalResult, Job, JobHandle, JobId, JobResult,
    JobStatus, RemoteResource, Translator,
};
use arbor_ir::ExecutionTarget;
use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{OnceCell, watch};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::assemble::{BackendInfo, TaskOutcome, assemble};
use crate::config::ExecConfig;
use crate::limiter::ResourceLimiter;
use crate::status::aggregate;
use crate::unit::ExecutionUnit;

/// Fans jobs out onto the execution slots of a [`ResourceLimiter`].
#[derive(Clone)]
pub struct JobScheduler {
    unit: ExecutionUnit,
    limiter: ResourceLimiter,
    backend: BackendInfo,
    max_shots: u32,
    max_qubits: usize,
    wait_timeout: Option<Duration>,
}

impl JobScheduler {
    /// Scheduler over the process-wide limiter with default limits.
    pub fn new(translator: Arc<dyn Translator>, resource: Arc<dyn RemoteResource>) -> Self {
        let unit = ExecutionUnit::new(translator, resource);
        let backend = BackendInfo::new(unit.resource_name(), env!("CARGO_PKG_VERSION"));
        let config = ExecConfig::default();
        Self {
            unit,
            limiter: ResourceLimiter::global(),
            backend,
            max_shots: config.max_shots,
            max_qubits: config.max_qubits,
            wait_timeout: config.wait_timeout(),
        }
    }

    /// Use `limiter` instead of the process-wide one.
    #[must_use]
    pub fn with_limiter(mut self, limiter: ResourceLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Stamp results with this backend identity.
    #[must_use]
    pub fn with_backend_info(mut self, backend: BackendInfo) -> Self {
        self.backend = backend;
        self
    }

    /// Apply shot and qubit limits and the default wait timeout.
    #[must_use]
    pub fn with_config(mut self, config: &ExecConfig) -> Self {
        self.max_shots = config.max_shots;
        self.max_qubits = config.max_qubits;
        self.wait_timeout = config.wait_timeout();
        self
    }

    /// The limiter tasks run under.
    pub fn limiter(&self) -> &ResourceLimiter {
        &self.limiter
    }

    /// Create an unsubmitted handle for `job`.
    pub fn schedule(&self, job: Job) -> ScheduledJob {
        let target = ExecutionTarget::new(job.shots())
            .with_emulator(job.target.as_emulator)
            .with_seed(job.seed());
        let target = match &job.target.lattice {
            Some(lattice) => target.with_resource(lattice.as_str()),
            None => target,
        };
        let (finished, _) = watch::channel(0usize);

        ScheduledJob {
            inner: Arc::new(JobInner {
                job,
                target,
                unit: self.unit.clone(),
                limiter: self.limiter.clone(),
                backend: self.backend.clone(),
                max_shots: self.max_shots,
                max_qubits: self.max_qubits,
                wait_timeout: self.wait_timeout,
                tasks: OnceLock::new(),
                submitted_at: OnceLock::new(),
                finished,
                result: OnceCell::new(),
            }),
        }
    }

    /// Schedule and submit `job`.
    pub async fn submit(&self, job: Job) -> HalResult<ScheduledJob> {
        let handle = self.schedule(job);
        handle.submit().await?;
        Ok(handle)
    }
}

/// Handle of one job.
///
/// Cloning yields another handle to the same job.
#[derive(Clone)]
pub struct ScheduledJob {
    inner: Arc<JobInner>,
}

struct JobInner {
    job: Job,
    target: ExecutionTarget,
    unit: ExecutionUnit,
    limiter: ResourceLimiter,
    backend: BackendInfo,
    max_shots: u32,
    max_qubits: usize,
    wait_timeout: Option<Duration>,
    tasks: OnceLock<Vec<Arc<TaskSlot>>>,
    submitted_at: OnceLock<Instant>,
    /// Number of tasks that reached a terminal state.
    finished: watch::Sender<usize>,
    result: OnceCell<HalResult<Arc<JobResult>>>,
}

/// State and outcome of one task, written only by that task.
struct TaskSlot {
    index: usize,
    name: String,
    state: Mutex<JobStatus>,
    outcome: Mutex<TaskOutcome>,
}

impl TaskSlot {
    fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            state: Mutex::new(JobStatus::Initializing),
            outcome: Mutex::new(None),
        }
    }

    fn state(&self) -> JobStatus {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, status: JobStatus) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn outcome(&self) -> TaskOutcome {
        self.outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish the outcome, then the terminal state it implies.
    fn finish(&self, outcome: HalResult<ExperimentResult>) {
        let status = match &outcome {
            Ok(_) => JobStatus::Done,
            Err(HalError::Cancelled(_)) => JobStatus::Cancelled,
            Err(_) => JobStatus::Error,
        };
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
        self.set_state(status);
    }
}

/// Marks a task finished when it ends. A task dropped before publishing
/// an outcome counts as cancelled.
struct TaskGuard {
    inner: Arc<JobInner>,
    slot: Arc<TaskSlot>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.slot.state().is_terminal() {
            self.slot.finish(Err(HalError::Cancelled(format!(
                "experiment {} ('{}') of job {}",
                self.slot.index, self.slot.name, self.inner.job.id
            ))));
        }
        self.inner.finished.send_modify(|n| *n += 1);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}

/// The guard is created before the task is spawned so that a task dropped
/// before its first poll is still accounted for.
async fn run_task(guard: TaskGuard, experiment: Experiment) {
    let TaskGuard { inner, slot } = &guard;

    let permit = match inner.limiter.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            slot.finish(Err(e));
            return;
        }
    };
    slot.set_state(JobStatus::Running);
    debug!("Task running");

    let outcome = AssertUnwindSafe(inner.unit.execute(&experiment, &inner.target))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(HalError::RemoteExecution(format!(
                "task '{}' panicked: {}",
                slot.name,
                panic_message(payload.as_ref())
            )))
        });
    drop(permit);

    match &outcome {
        Ok(result) => debug!(outcomes = result.counts.len(), "Task done"),
        Err(e) => warn!(error = %e, "Task failed"),
    }
    slot.finish(outcome);
}

impl JobInner {
    fn tasks(&self) -> &[Arc<TaskSlot>] {
        self.tasks.get().map(Vec::as_slice).unwrap_or_default()
    }

    fn validate(&self) -> HalResult<()> {
        let spec = &self.job.spec;
        if spec.experiments.is_empty() {
            return Err(HalError::InvalidJob(format!(
                "job {} has no experiments",
                self.job.id
            )));
        }
        if spec.config.shots == 0 || spec.config.shots > self.max_shots {
            return Err(HalError::InvalidJob(format!(
                "shots must be between 1 and {}, got {}",
                self.max_shots, spec.config.shots
            )));
        }
        if let Some(exp) = spec
            .experiments
            .iter()
            .find(|e| e.num_qubits() as usize > self.max_qubits)
        {
            return Err(HalError::InvalidJob(format!(
                "experiment '{}' uses {} qubits, limit is {}",
                exp.name(),
                exp.num_qubits(),
                self.max_qubits
            )));
        }
        Ok(())
    }

    async fn assembled(&self) -> HalResult<Arc<JobResult>> {
        self.result
            .get_or_init(|| async {
                let outcomes = self.tasks().iter().map(|t| t.outcome()).collect();
                let time_taken = self
                    .submitted_at
                    .get()
                    .map_or(0.0, |t| t.elapsed().as_secs_f64());
                assemble(&self.job, &self.backend, outcomes, time_taken).map(Arc::new)
            })
            .await
            .clone()
    }
}

impl ScheduledJob {
    /// The job this handle runs.
    pub fn job(&self) -> &Job {
        &self.inner.job
    }

    /// Execution target derived from the job.
    pub fn target(&self) -> &ExecutionTarget {
        &self.inner.target
    }

    /// Whether `submit` has succeeded.
    pub fn is_submitted(&self) -> bool {
        self.inner.tasks.get().is_some()
    }

    /// Current state of every task, in submission order.
    pub fn task_states(&self) -> Vec<JobStatus> {
        self.inner.tasks().iter().map(|t| t.state()).collect()
    }

    /// Results of the experiments that have succeeded so far, in
    /// submission order. Unlike [`JobHandle::result`], failures elsewhere
    /// in the job do not hide these.
    pub fn successful_results(&self) -> Vec<ExperimentResult> {
        self.inner
            .tasks()
            .iter()
            .filter_map(|t| t.outcome().and_then(Result::ok))
            .collect()
    }
}

#[async_trait]
impl JobHandle for ScheduledJob {
    fn job_id(&self) -> &JobId {
        &self.inner.job.id
    }

    #[instrument(skip(self), fields(job_id = %self.inner.job.id))]
    async fn submit(&self) -> HalResult<()> {
        let inner = &self.inner;
        inner.validate()?;

        let slots = inner
            .job
            .spec
            .experiments
            .iter()
            .enumerate()
            .map(|(i, e)| Arc::new(TaskSlot::new(i, e.name())))
            .collect();
        if inner.tasks.set(slots).is_err() {
            return Err(HalError::AlreadySubmitted(inner.job.id.to_string()));
        }
        let _ = inner.submitted_at.set(Instant::now());

        info!(
            experiments = inner.job.num_experiments(),
            shots = inner.target.shots,
            resource = inner.target.resource.as_deref().unwrap_or("default"),
            "Submitting job"
        );

        for slot in inner.tasks() {
            slot.set_state(JobStatus::Queued);
            let experiment = inner.job.spec.experiments[slot.index].clone();
            let span = info_span!(
                "task",
                job_id = %inner.job.id,
                index = slot.index,
                experiment = %slot.name
            );
            let guard = TaskGuard {
                inner: Arc::clone(inner),
                slot: Arc::clone(slot),
            };
            tokio::spawn(run_task(guard, experiment).instrument(span));
        }
        Ok(())
    }

    fn status(&self) -> JobStatus {
        if self.is_submitted() {
            aggregate(self.task_states())
        } else {
            JobStatus::Initializing
        }
    }

    #[instrument(skip(self), fields(job_id = %self.inner.job.id))]
    async fn wait(&self, timeout: Option<Duration>) -> HalResult<()> {
        let inner = &self.inner;
        let Some(tasks) = inner.tasks.get() else {
            return Err(HalError::InvalidJob(format!(
                "job {} has not been submitted",
                inner.job.id
            )));
        };
        let total = tasks.len();
        let mut rx = inner.finished.subscribe();
        let all_finished = async move {
            rx.wait_for(|n| *n >= total)
                .await
                .map(|_| ())
                .map_err(|_| HalError::RemoteExecution("job state dropped".into()))
        };

        match timeout.or(inner.wait_timeout) {
            Some(limit) => {
                if let Ok(finished) = tokio::time::timeout(limit, all_finished).await {
                    finished?;
                } else {
                    debug!(?limit, "Wait timed out");
                    return Ok(());
                }
            }
            None => all_finished.await?,
        }

        inner.assembled().await.map(|_| ())
    }

    async fn result(&self, timeout: Option<Duration>) -> HalResult<Arc<JobResult>> {
        self.wait(timeout).await?;
        match self.inner.result.get() {
            Some(result) => result.clone(),
            None => Err(HalError::Timeout(self.inner.job.id.to_string())),
        }
    }

    async fn cancel(&self) -> HalResult<()> {
        info!(job_id = %self.inner.job.id, "Cancel requested; dispatched tasks run to completion");
        Ok(())
    }
}
