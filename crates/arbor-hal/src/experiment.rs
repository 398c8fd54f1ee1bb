//! Inbound job description.
//!
//! The interchange format mirrors a compiled-circuit batch: a job carries
//! run configuration (shots, seed) and an ordered list of experiments, each
//! with a header describing its register layout and a flat instruction
//! list. Instruction names are resolved by a [`Translator`].
//!
//! [`Translator`]: crate::translator::Translator

use serde::{Deserialize, Serialize};

/// Default shot count when a job description omits one.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Header metadata of one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperimentHeader {
    /// Experiment name; results are looked up by it.
    pub name: String,
    /// Number of qubits, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_qubits: Option<u32>,
    /// Number of classical memory slots, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_slots: Option<u32>,
    /// Quantum registers as (name, size), in declaration order.
    #[serde(default)]
    pub qreg_sizes: Vec<(String, u32)>,
    /// Classical registers as (name, size), in declaration order.
    #[serde(default)]
    pub creg_sizes: Vec<(String, u32)>,
}

impl ExperimentHeader {
    /// Header with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Classical condition attached to an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionCondition {
    /// Classical register name.
    pub register: String,
    /// Value the register must hold for the instruction to fire.
    pub value: u64,
}

/// One instruction of an experiment, by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInstruction {
    /// Gate or operation name (`h`, `cx`, `u3`, `measure`, ...).
    pub name: String,
    /// Qubit operands.
    #[serde(default)]
    pub qubits: Vec<u32>,
    /// Classical memory slots written by a measurement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory: Vec<u32>,
    /// Gate parameters in radians.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Optional classical condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<InstructionCondition>,
}

impl ExperimentInstruction {
    /// A gate acting on `qubits`.
    pub fn gate(name: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
            memory: vec![],
            params: vec![],
            condition: None,
        }
    }

    /// A parameterized gate acting on `qubits`.
    pub fn parameterized(
        name: impl Into<String>,
        params: impl IntoIterator<Item = f64>,
        qubits: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            ..Self::gate(name, qubits)
        }
    }

    /// Measure `qubit` into memory slot `slot`.
    pub fn measure(qubit: u32, slot: u32) -> Self {
        Self {
            memory: vec![slot],
            ..Self::gate("measure", [qubit])
        }
    }

    /// Attach a classical condition.
    #[must_use]
    pub fn when(mut self, register: impl Into<String>, value: u64) -> Self {
        self.condition = Some(InstructionCondition {
            register: register.into(),
            value,
        });
        self
    }
}

/// One independent experiment of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Header metadata.
    pub header: ExperimentHeader,
    /// Instructions in program order.
    #[serde(default)]
    pub instructions: Vec<ExperimentInstruction>,
}

impl Experiment {
    /// Empty experiment over `n_qubits` with the given classical registers.
    pub fn new(
        name: impl Into<String>,
        n_qubits: u32,
        cregs: impl IntoIterator<Item = (&'static str, u32)>,
    ) -> Self {
        let creg_sizes: Vec<(String, u32)> = cregs
            .into_iter()
            .map(|(n, s)| (n.to_string(), s))
            .collect();
        let memory_slots = creg_sizes.iter().map(|(_, s)| s).sum();
        Self {
            header: ExperimentHeader {
                name: name.into(),
                n_qubits: Some(n_qubits),
                memory_slots: Some(memory_slots),
                qreg_sizes: vec![("q".to_string(), n_qubits)],
                creg_sizes,
            },
            instructions: vec![],
        }
    }

    /// Append an instruction.
    #[must_use]
    pub fn push(mut self, instruction: ExperimentInstruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Experiment name.
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Declared qubit count, or one past the highest qubit operand.
    pub fn num_qubits(&self) -> u32 {
        self.header.n_qubits.unwrap_or_else(|| {
            self.instructions
                .iter()
                .flat_map(|i| i.qubits.iter())
                .max()
                .map_or(0, |q| q + 1)
        })
    }

    /// Declared memory slot count, or the register total, or one past the
    /// highest memory operand.
    pub fn num_memory_slots(&self) -> u32 {
        if let Some(slots) = self.header.memory_slots {
            return slots;
        }
        let declared: u32 = self.header.creg_sizes.iter().map(|(_, s)| s).sum();
        let used = self
            .instructions
            .iter()
            .flat_map(|i| i.memory.iter())
            .max()
            .map_or(0, |m| m + 1);
        declared.max(used)
    }
}

/// Run configuration of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Shots per experiment.
    #[serde(default = "default_shots")]
    pub shots: u32,
    /// Sampling seed for seedable resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_simulator: Option<u64>,
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            shots: DEFAULT_SHOTS,
            seed_simulator: None,
        }
    }
}

/// A batch of experiments submitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Caller-side identifier of the batch.
    #[serde(default)]
    pub qobj_id: String,
    /// Opaque caller header, echoed into the result.
    #[serde(default)]
    pub header: serde_json::Value,
    /// Run configuration.
    #[serde(default)]
    pub config: JobConfig,
    /// Experiments, in order.
    pub experiments: Vec<Experiment>,
}

impl JobSpec {
    /// Batch of experiments with the given shots and no seed.
    pub fn new(experiments: Vec<Experiment>, shots: u32) -> Self {
        Self {
            qobj_id: String::new(),
            header: serde_json::Value::Null,
            config: JobConfig {
                shots,
                seed_simulator: None,
            },
            experiments,
        }
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed_simulator = Some(seed);
        self
    }

    /// Set the caller-side identifier.
    #[must_use]
    pub fn with_qobj_id(mut self, qobj_id: impl Into<String>) -> Self {
        self.qobj_id = qobj_id.into();
        self
    }
}
