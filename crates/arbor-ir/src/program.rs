//! Translated programs ready for an execution resource.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;

/// Resource name that selects statevector collection.
pub const STATEVECTOR_RESOURCE: &str = "statevector_simulator";

/// Where and how a program is meant to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTarget {
    /// Lattice or resource name; `None` selects the resource's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Run on a local emulated instance instead of genuine hardware.
    #[serde(default)]
    pub as_emulator: bool,
    /// Requested shot count.
    pub shots: u32,
    /// Sampling seed, for resources that support seeding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ExecutionTarget {
    /// Target the default resource with the given shot count.
    pub fn new(shots: u32) -> Self {
        Self {
            resource: None,
            as_emulator: false,
            shots,
            seed: None,
        }
    }

    /// Select a resource by name.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Request the emulated instance of the resource.
    #[must_use]
    pub fn with_emulator(mut self, as_emulator: bool) -> Self {
        self.as_emulator = as_emulator;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Whether this target collects statevectors.
    pub fn is_statevector(&self) -> bool {
        self.resource.as_deref() == Some(STATEVECTOR_RESOURCE)
    }
}

/// A structured program: instruction list plus execution target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The circuit to execute.
    pub circuit: Circuit,
    /// Execution target.
    pub target: ExecutionTarget,
}

impl Program {
    /// Bind a circuit to a target.
    pub fn new(circuit: Circuit, target: ExecutionTarget) -> Self {
        Self { circuit, target }
    }

    /// Number of qubits in the program.
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Number of classical bits in the program.
    pub fn num_clbits(&self) -> usize {
        self.circuit.num_clbits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statevector_target() {
        let target = ExecutionTarget::new(256).with_resource(STATEVECTOR_RESOURCE);
        assert!(target.is_statevector());
        assert!(!ExecutionTarget::new(256).is_statevector());
        assert!(!ExecutionTarget::new(256).with_resource("Aspen-4").is_statevector());
    }

    #[test]
    fn test_program_serializes() {
        let program = Program::new(
            Circuit::bell().unwrap(),
            ExecutionTarget::new(16).with_seed(Some(7)),
        );
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json["target"]["shots"], 16);
        assert_eq!(json["target"]["seed"], 7);
        assert!(json["target"].get("resource").is_none());
    }
}
