//! Error types for experiment translation.

use arbor_hal::HalError;
use thiserror::Error;

/// Errors that can occur while translating an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslateError {
    /// Instruction name not in the gate table.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Measurement whose qubits and memory slots do not pair up.
    #[error("Measurement of {qubits} qubit(s) into {memory} memory slot(s)")]
    UnpairedMeasurement { qubits: usize, memory: usize },

    /// Classical condition on an instruction that cannot carry one.
    #[error("'{0}' cannot be classically conditioned")]
    UnconditionalOnly(String),

    /// Instruction `index` of the experiment failed.
    #[error("Instruction {index} ('{name}'): {source}")]
    AtInstruction {
        index: usize,
        name: String,
        #[source]
        source: Box<TranslateError>,
    },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] arbor_ir::IrError),
}

impl From<TranslateError> for HalError {
    fn from(e: TranslateError) -> Self {
        HalError::Translation(e.to_string())
    }
}

/// Result type for translation.
pub type TranslateResult<T> = Result<T, TranslateError>;
