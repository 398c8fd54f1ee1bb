//! Lattice backend facade.
//!
//! [`LatticeBackend`] is the entry point most callers need: it names the
//! backend, describes its configuration, and turns a [`JobSpec`] into a
//! submitted [`ScheduledJob`].

use std::sync::Arc;

use arbor_adapter_sim::EmulatedResource;
use arbor_hal::{
    HalResult, Job, JobHandle, JobId, JobSpec, RemoteResource, ResourceTarget, Translator,
};
use arbor_translate::QobjTranslator;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::assemble::BackendInfo;
use crate::config::ExecConfig;
use crate::limiter::ResourceLimiter;
use crate::scheduler::{JobScheduler, ScheduledJob};

/// Base backend name.
pub const BACKEND_NAME: &str = "Forest";

/// Backend version reported in results.
pub const BACKEND_VERSION: &str = "0.0.1";

/// Gates the backend advertises.
pub const BASIS_GATES: &[&str] = &["u1", "u2", "u3", "cx", "id", "x", "y", "z", "h", "s", "t"];

/// Static description of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    pub backend_name: String,
    pub backend_version: String,
    pub n_qubits: u32,
    pub url: String,
    pub simulator: bool,
    pub local: bool,
    pub conditional: bool,
    pub open_pulse: bool,
    pub memory: bool,
    pub max_shots: u32,
    pub description: String,
    /// `None` means all-to-all connectivity.
    pub coupling_map: Option<Vec<[u32; 2]>>,
    pub basis_gates: Vec<String>,
}

impl Default for BackendConfiguration {
    fn default() -> Self {
        Self {
            backend_name: BACKEND_NAME.to_string(),
            backend_version: BACKEND_VERSION.to_string(),
            n_qubits: 32,
            url: "https://quantastica.com/".to_string(),
            simulator: true,
            local: true,
            conditional: false,
            open_pulse: false,
            memory: true,
            max_shots: 65536,
            description: "A Forest based qasm simulator".to_string(),
            coupling_map: None,
            basis_gates: BASIS_GATES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// A backend bound to an optional lattice.
#[derive(Clone)]
pub struct LatticeBackend {
    lattice: Option<String>,
    as_emulator: bool,
    name: String,
    configuration: BackendConfiguration,
    scheduler: JobScheduler,
}

impl LatticeBackend {
    /// Backend over `resource` sharing the process-wide limiter.
    pub fn new(
        lattice: Option<&str>,
        as_emulator: bool,
        translator: Arc<dyn Translator>,
        resource: Arc<dyn RemoteResource>,
    ) -> Self {
        let name = match lattice {
            Some(lattice) => format!("{BACKEND_NAME}_{lattice}"),
            None => BACKEND_NAME.to_string(),
        };
        let scheduler = JobScheduler::new(translator, resource)
            .with_backend_info(BackendInfo::new(name.as_str(), BACKEND_VERSION));

        Self {
            lattice: lattice.map(str::to_string),
            as_emulator,
            name,
            configuration: BackendConfiguration::default(),
            scheduler,
        }
    }

    /// Backend with limits taken from `config`.
    ///
    /// Sizes the process-wide limiter if no one has yet.
    pub fn from_config(
        config: &ExecConfig,
        lattice: Option<&str>,
        as_emulator: bool,
        translator: Arc<dyn Translator>,
        resource: Arc<dyn RemoteResource>,
    ) -> HalResult<Self> {
        config.validate()?;
        ResourceLimiter::init_global(config.max_concurrent_executions);

        let mut backend = Self::new(lattice, as_emulator, translator, resource);
        backend.scheduler = backend.scheduler.with_config(config);
        backend.configuration.max_shots = config.max_shots;
        backend.configuration.n_qubits = u32::try_from(config.max_qubits).unwrap_or(u32::MAX);
        Ok(backend)
    }

    /// Use `limiter` instead of the process-wide one.
    #[must_use]
    pub fn with_limiter(mut self, limiter: ResourceLimiter) -> Self {
        self.scheduler = self.scheduler.with_limiter(limiter);
        self
    }

    /// `Forest`, or `Forest_<lattice>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        BACKEND_VERSION
    }

    pub fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    pub fn lattice(&self) -> Option<&str> {
        self.lattice.as_deref()
    }

    pub fn as_emulator(&self) -> bool {
        self.as_emulator
    }

    /// Create an unsubmitted handle for `spec` under a fresh job id.
    pub fn job(&self, spec: JobSpec) -> ScheduledJob {
        let target = ResourceTarget {
            lattice: self.lattice.clone(),
            as_emulator: self.as_emulator,
        };
        self.scheduler
            .schedule(Job::new(JobId::random(), spec, target))
    }

    /// Submit `spec` and return its handle.
    #[instrument(skip_all, fields(backend = %self.name, experiments = spec.experiments.len()))]
    pub async fn run(&self, spec: JobSpec) -> HalResult<ScheduledJob> {
        let handle = self.job(spec);
        handle.submit().await?;
        info!(job_id = %handle.job_id(), "Job submitted");
        Ok(handle)
    }
}

impl std::fmt::Debug for LatticeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatticeBackend")
            .field("name", &self.name)
            .field("as_emulator", &self.as_emulator)
            .finish_non_exhaustive()
    }
}

/// Backend on the local emulator with the reference translator.
pub fn get_backend(lattice: Option<&str>, as_emulator: bool) -> LatticeBackend {
    LatticeBackend::new(
        lattice,
        as_emulator,
        Arc::new(QobjTranslator::new()),
        Arc::new(EmulatedResource::new()),
    )
}
