//! End-to-end job tests: reference translator, scheduler, and either the
//! local emulator or an instrumented mock resource.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arbor_adapter_sim::EmulatedResource;
use arbor_exec::{JobScheduler, LatticeBackend, ResourceLimiter, get_backend};
use arbor_hal::{
    Experiment, ExperimentInstruction, HalError, HalResult, Job, JobHandle, JobId, JobSpec,
    JobStatus, RawShot, RemoteResource, ResourceTarget,
};
use arbor_ir::{Program, STATEVECTOR_RESOURCE};
use arbor_translate::QobjTranslator;
use async_trait::async_trait;
use num_complex::Complex64;

// ============================================================================
// Fixtures
// ============================================================================

fn bell() -> Experiment {
    Experiment::new("Bell", 2, [("c", 2)])
        .push(ExperimentInstruction::gate("h", [0]))
        .push(ExperimentInstruction::gate("cx", [0, 1]))
        .push(ExperimentInstruction::measure(0, 0))
        .push(ExperimentInstruction::measure(1, 1))
}

/// Teleports |1> from q0 to q2; corrections are applied as quantum
/// controls after the mid-circuit measurements.
fn teleport() -> Experiment {
    Experiment::new("Teleport", 3, [("c", 3)])
        .push(ExperimentInstruction::gate("x", [0]))
        .push(ExperimentInstruction::gate("h", [1]))
        .push(ExperimentInstruction::gate("cx", [1, 2]))
        .push(ExperimentInstruction::gate("cx", [0, 1]))
        .push(ExperimentInstruction::gate("h", [0]))
        .push(ExperimentInstruction::measure(0, 0))
        .push(ExperimentInstruction::measure(1, 1))
        .push(ExperimentInstruction::gate("cx", [1, 2]))
        .push(ExperimentInstruction::gate("cz", [0, 2]))
        .push(ExperimentInstruction::measure(2, 2))
}

fn flip(name: &'static str) -> Experiment {
    Experiment::new(name, 1, [("c", 1)])
        .push(ExperimentInstruction::gate("x", [0]))
        .push(ExperimentInstruction::measure(0, 0))
}

fn emulator(permits: usize) -> LatticeBackend {
    get_backend(None, false).with_limiter(ResourceLimiter::new(permits))
}

/// Mock resource that sleeps per run and records peak concurrency.
#[derive(Default)]
struct ConcurrencyGauge {
    delay_ms: u64,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    fn new(delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            delay_ms,
            ..Self::default()
        })
    }
}

#[async_trait]
impl RemoteResource for ConcurrencyGauge {
    fn name(&self) -> &str {
        "gauge"
    }

    async fn run(&self, program: &Program, shots: u32) -> HalResult<Vec<RawShot>> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![vec![1; program.num_clbits()]; shots as usize])
    }

    async fn amplitudes(&self, program: &Program) -> HalResult<Vec<Complex64>> {
        Ok(vec![Complex64::new(1.0, 0.0); 1 << program.num_qubits()])
    }
}

/// Mock resource where experiment `eN` takes `200 - 40 * N` ms, so later
/// experiments finish first. Records completion order and call count.
#[derive(Default)]
struct Staggered {
    calls: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl RemoteResource for Staggered {
    fn name(&self) -> &str {
        "staggered"
    }

    async fn run(&self, program: &Program, shots: u32) -> HalResult<Vec<RawShot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = program.circuit.name().to_string();
        let index: u64 = name.trim_start_matches('e').parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(200 - 40 * index.min(4))).await;
        self.completed.lock().unwrap().push(name);
        Ok(vec![vec![1; program.num_clbits()]; shots as usize])
    }

    async fn amplitudes(&self, program: &Program) -> HalResult<Vec<Complex64>> {
        Ok(vec![Complex64::new(1.0, 0.0); 1 << program.num_qubits()])
    }
}

fn numbered_job(n: usize) -> Job {
    const NAMES: [&str; 6] = ["e0", "e1", "e2", "e3", "e4", "e5"];
    let experiments = NAMES[..n].iter().map(|name| flip(name)).collect();
    Job::new(JobId::random(), JobSpec::new(experiments, 4), ResourceTarget::default())
}

// ============================================================================
// Results
// ============================================================================

#[tokio::test]
async fn test_bell_counts() {
    let job = emulator(1)
        .run(JobSpec::new(vec![bell()], 256).with_seed(1))
        .await
        .unwrap();
    let result = job.result(None).await.unwrap();

    assert!(result.success);
    let counts = result.counts("Bell").unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.total_shots(), 256);
    assert!(counts.get("0x0") > 0);
    assert!(counts.get("0x3") > 0);
}

#[tokio::test]
async fn test_bell_and_teleport() {
    let job = emulator(1)
        .run(JobSpec::new(vec![bell(), teleport()], 1024).with_seed(5))
        .await
        .unwrap();
    let result = job.result(None).await.unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), ["Bell", "Teleport"]);
    assert_eq!(result.counts("Bell").unwrap().len(), 2);

    let teleported = result.counts("Teleport").unwrap();
    assert_eq!(teleported.len(), 4);
    for label in ["0x4", "0x5", "0x6", "0x7"] {
        assert!(teleported.get(label) > 0, "missing {label}");
    }
    assert_eq!(teleported.total_shots(), 1024);
}

#[tokio::test]
async fn test_results_follow_submission_order() {
    let names = ["first", "second", "third", "fourth"];
    let experiments = names.iter().map(|n| flip(n)).collect();
    let job = emulator(2)
        .run(JobSpec::new(experiments, 8))
        .await
        .unwrap();
    let result = job.result(None).await.unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), names);
    assert_eq!(result.experiment_at(2).unwrap().name(), "third");
    assert!(result.results.iter().all(|r| r.counts.get("0x1") == 8));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reverse_completion_keeps_submission_order() {
    let resource = Arc::new(Staggered::default());
    let scheduler = JobScheduler::new(Arc::new(QobjTranslator::new()), resource.clone())
        .with_limiter(ResourceLimiter::new(5));
    let job = scheduler.submit(numbered_job(5)).await.unwrap();

    let (a, b, c) = tokio::join!(job.result(None), job.result(None), job.result(None));
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    let completed = resource.completed.lock().unwrap().clone();
    assert_eq!(completed, ["e4", "e3", "e2", "e1", "e0"]);
    assert_eq!(a.names().collect::<Vec<_>>(), ["e0", "e1", "e2", "e3", "e4"]);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
    assert_eq!(resource.calls.load(Ordering::SeqCst), 5);
    assert_eq!(job.status(), JobStatus::Done);
}

#[tokio::test]
async fn test_result_is_memoized() {
    let job = emulator(1)
        .run(JobSpec::new(vec![bell()], 32))
        .await
        .unwrap();
    let first = job.result(None).await.unwrap();
    let second = job.result(None).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_seed_determinism() {
    let backend = emulator(1);
    let run = |seed| {
        let backend = backend.clone();
        async move {
            let job = backend
                .run(JobSpec::new(vec![bell()], 500).with_seed(seed))
                .await
                .unwrap();
            job.result(None).await.unwrap().counts("Bell").unwrap().clone()
        }
    };

    let a = run(123).await;
    let b = run(123).await;
    let c = run(321).await;
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[tokio::test]
async fn test_statevector_mode() {
    let job = get_backend(Some(STATEVECTOR_RESOURCE), false)
        .with_limiter(ResourceLimiter::new(1))
        .run(JobSpec::new(vec![bell()], 1000).with_seed(9))
        .await
        .unwrap();
    let result = job.result(None).await.unwrap();

    let experiment = result.experiment("Bell").unwrap();
    assert_eq!(experiment.shots, 1);
    assert_eq!(experiment.counts.total_shots(), 1);
    assert_eq!(experiment.counts.len(), 1);

    let state = result.statevector("Bell").unwrap().unwrap();
    assert_eq!(state.len(), 4);
    let probs = state.probabilities();
    assert!((probs[0] - 0.5).abs() < 1e-9);
    assert!((probs[3] - 0.5).abs() < 1e-9);
    assert!(probs[1].abs() < 1e-9 && probs[2].abs() < 1e-9);
}

#[tokio::test]
async fn test_unknown_experiment() {
    let job = emulator(1)
        .run(JobSpec::new(vec![bell()], 16))
        .await
        .unwrap();
    let result = job.result(None).await.unwrap();

    assert!(matches!(
        result.counts("Nope"),
        Err(HalError::ExperimentNotFound(name)) if name == "Nope"
    ));
    assert!(result.statevector("Bell").unwrap().is_none());
}

// ============================================================================
// Status and failures
// ============================================================================

#[tokio::test]
async fn test_translation_failure_fails_job() {
    let broken = Experiment::new("Broken", 1, [("c", 1)])
        .push(ExperimentInstruction::gate("frobnicate", [0]));
    let job = emulator(1)
        .run(JobSpec::new(vec![bell(), broken], 16))
        .await
        .unwrap();

    let err = job.wait(None).await.unwrap_err();
    assert!(matches!(err, HalError::Translation(_)));
    assert_eq!(job.status(), JobStatus::Error);
    assert_eq!(job.task_states(), [JobStatus::Done, JobStatus::Error]);
    assert_eq!(job.result(None).await.unwrap_err(), err);
    assert_eq!(job.successful_results().len(), 1);
}

#[tokio::test]
async fn test_submit_twice_rejected() {
    let backend = emulator(1);
    let job = backend.job(JobSpec::new(vec![bell()], 16));
    assert_eq!(job.status(), JobStatus::Initializing);

    job.submit().await.unwrap();
    assert!(matches!(
        job.submit().await,
        Err(HalError::AlreadySubmitted(_))
    ));
    job.wait(None).await.unwrap();
    assert_eq!(job.status(), JobStatus::Done);
}

#[tokio::test]
async fn test_wait_timeout_while_running() {
    let scheduler = JobScheduler::new(Arc::new(QobjTranslator::new()), ConcurrencyGauge::new(200))
        .with_limiter(ResourceLimiter::new(1));
    let job = scheduler.submit(numbered_job(1)).await.unwrap();

    job.wait(Some(Duration::from_millis(20))).await.unwrap();
    assert!(job.status().is_pending());

    job.wait(None).await.unwrap();
    assert_eq!(job.status(), JobStatus::Done);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_slot_serializes_tasks() {
    let gauge = ConcurrencyGauge::new(20);
    let scheduler = JobScheduler::new(Arc::new(QobjTranslator::new()), gauge.clone())
        .with_limiter(ResourceLimiter::new(1));

    let job = scheduler.submit(numbered_job(5)).await.unwrap();
    job.wait(None).await.unwrap();

    assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    assert_eq!(job.status(), JobStatus::Done);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wider_limiter_overlaps_tasks() {
    let gauge = ConcurrencyGauge::new(100);
    let scheduler = JobScheduler::new(Arc::new(QobjTranslator::new()), gauge.clone())
        .with_limiter(ResourceLimiter::new(3));

    let job = scheduler.submit(numbered_job(6)).await.unwrap();
    job.wait(None).await.unwrap();

    let peak = gauge.peak.load(Ordering::SeqCst);
    assert!(peak > 1 && peak <= 3, "peak concurrency {peak}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_limiter_shared_across_jobs() {
    let gauge = ConcurrencyGauge::new(20);
    let scheduler = JobScheduler::new(Arc::new(QobjTranslator::new()), gauge.clone())
        .with_limiter(ResourceLimiter::new(1));

    let a = scheduler.submit(numbered_job(3)).await.unwrap();
    let b = scheduler.submit(numbered_job(3)).await.unwrap();
    let outcomes = futures::future::join_all([a.wait(None), b.wait(None)]).await;

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_emulator_guarded_by_limiter() {
    let experiments: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| flip(n)).collect();
    let backend = LatticeBackend::new(
        None,
        false,
        Arc::new(QobjTranslator::new()),
        Arc::new(EmulatedResource::new()),
    )
    .with_limiter(ResourceLimiter::new(1));

    let job = backend.run(JobSpec::new(experiments, 64)).await.unwrap();
    let result = job.result(None).await.unwrap();
    assert_eq!(result.results.len(), 4);
}
