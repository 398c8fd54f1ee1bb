//! Result envelopes.
//!
//! Outcome labels are hexadecimal renderings of the classical memory read
//! as an unsigned integer, clbit `i` carrying weight `2^i`, with no
//! zero-padding: `"0x0"`, `"0x3"`, `"0x1f"`.

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};
use crate::experiment::ExperimentHeader;
use crate::job::{JobId, JobStatus};

/// Measurement counts of one experiment.
///
/// Maps outcome labels to occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (label, count) pairs.
    /// Duplicate labels are accumulated.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Add `count` occurrences of `label`.
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        *self.counts.entry(label.into()).or_default() += count;
    }

    /// Get the count for a label.
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Iterate over (label, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Most frequent label. Ties resolve to the smallest label.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Probability of each label.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots() as f64;
        if total == 0.0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }

    /// Counts sorted by count descending, then by label.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut items: Vec<_> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        items
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Full amplitude vector of an experiment.
///
/// Index `k` is the basis state whose bit `j` is the value of qubit `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector(Vec<Complex64>);

impl StateVector {
    /// Wrap raw amplitudes.
    pub fn new(amplitudes: Vec<Complex64>) -> Self {
        Self(amplitudes)
    }

    /// Amplitudes in basis order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.0
    }

    /// Amplitude of basis state `index`.
    pub fn amplitude(&self, index: usize) -> Option<Complex64> {
        self.0.get(index).copied()
    }

    /// Number of amplitudes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no amplitudes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Qubit count implied by the vector length.
    pub fn num_qubits(&self) -> u32 {
        self.0.len().max(1).trailing_zeros()
    }

    /// Born-rule probabilities in basis order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.0.iter().map(|a| a.norm_sqr()).collect()
    }
}

/// Result of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Whether the experiment ran successfully.
    pub success: bool,
    /// Final task status.
    pub status: JobStatus,
    /// Shots actually executed (1 in statevector mode).
    pub shots: u32,
    /// Header echoed from the input experiment.
    pub header: ExperimentHeader,
    /// Measurement histogram.
    pub counts: Counts,
    /// Amplitudes, in statevector mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statevector: Option<StateVector>,
    /// Seed used for sampling, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ExperimentResult {
    /// Successful counts-only result.
    pub fn new(header: ExperimentHeader, shots: u32, counts: Counts) -> Self {
        Self {
            success: true,
            status: JobStatus::Done,
            shots,
            header,
            counts,
            statevector: None,
            seed: None,
        }
    }

    /// Attach amplitudes.
    #[must_use]
    pub fn with_statevector(mut self, statevector: StateVector) -> Self {
        self.statevector = Some(statevector);
        self
    }

    /// Record the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Experiment name.
    pub fn name(&self) -> &str {
        &self.header.name
    }
}

/// Combined result of a job, experiments in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Whether every experiment succeeded.
    pub success: bool,
    /// Job identifier.
    pub job_id: JobId,
    /// Caller-side batch identifier.
    pub qobj_id: String,
    /// Backend that ran the job.
    pub backend_name: String,
    /// Backend version.
    pub backend_version: String,
    /// Caller header echoed from the job description.
    #[serde(default)]
    pub header: serde_json::Value,
    /// Per-experiment results, in submission order.
    pub results: Vec<ExperimentResult>,
    /// Overall status string.
    pub status: String,
    /// Time the result was assembled.
    pub date: DateTime<Utc>,
    /// Seconds between submission and assembly.
    pub time_taken: f64,
}

impl JobResult {
    /// Result of the experiment called `name`. The first match wins.
    pub fn experiment(&self, name: &str) -> HalResult<&ExperimentResult> {
        self.results
            .iter()
            .find(|r| r.header.name == name)
            .ok_or_else(|| HalError::ExperimentNotFound(name.to_string()))
    }

    /// Result at submission position `index`.
    pub fn experiment_at(&self, index: usize) -> HalResult<&ExperimentResult> {
        self.results
            .get(index)
            .ok_or_else(|| HalError::ExperimentNotFound(format!("#{index}")))
    }

    /// Counts of the experiment called `name`.
    pub fn counts(&self, name: &str) -> HalResult<&Counts> {
        self.experiment(name).map(|r| &r.counts)
    }

    /// Amplitudes of the experiment called `name`. `Ok(None)` when the
    /// experiment ran in counts-only mode.
    pub fn statevector(&self, name: &str) -> HalResult<Option<&StateVector>> {
        self.experiment(name).map(|r| r.statevector.as_ref())
    }

    /// Experiment names in submission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(ExperimentResult::name)
    }
}
