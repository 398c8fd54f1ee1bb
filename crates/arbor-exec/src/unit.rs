//! Execution of a single experiment.

use std::sync::Arc;

use arbor_hal::{
    Counts, Experiment, ExperimentResult, HalError, HalResult, RawShot, RemoteResource,
    StateVector, Translator,
};
use arbor_ir::{ExecutionTarget, Program};
use tracing::{debug, instrument};

/// Runs one experiment against the execution resource and normalizes its
/// raw memory into a [`Counts`] histogram.
///
/// Units hold no per-run state, so one unit may execute many experiments
/// concurrently.
#[derive(Clone)]
pub struct ExecutionUnit {
    translator: Arc<dyn Translator>,
    resource: Arc<dyn RemoteResource>,
}

impl ExecutionUnit {
    /// Bind a translator to a resource.
    pub fn new(translator: Arc<dyn Translator>, resource: Arc<dyn RemoteResource>) -> Self {
        Self {
            translator,
            resource,
        }
    }

    /// Name of the bound resource.
    pub fn resource_name(&self) -> &str {
        self.resource.name()
    }

    /// Translate and run `experiment`.
    ///
    /// In statevector mode the program runs once for its amplitudes and
    /// once for a single sampled outcome; the result then reports one shot.
    #[instrument(skip_all, fields(experiment = %experiment.name(), resource = %self.resource.name()))]
    pub async fn execute(
        &self,
        experiment: &Experiment,
        target: &ExecutionTarget,
    ) -> HalResult<ExperimentResult> {
        let program = self.translator.translate(experiment, target)?;

        let result = if target.is_statevector() {
            let amplitudes = self.resource.amplitudes(&program).await?;
            let expected = 1usize
                .checked_shl(program.num_qubits() as u32)
                .unwrap_or(usize::MAX);
            if amplitudes.len() != expected {
                return Err(HalError::Protocol(format!(
                    "expected {expected} amplitudes for {} qubits, got {}",
                    program.num_qubits(),
                    amplitudes.len()
                )));
            }
            let memory = self.resource.run(&program, 1).await?;
            let counts = histogram(&program, &memory, 1)?;
            ExperimentResult::new(experiment.header.clone(), 1, counts)
                .with_statevector(StateVector::new(amplitudes))
        } else {
            let memory = self.resource.run(&program, target.shots).await?;
            let counts = histogram(&program, &memory, target.shots)?;
            ExperimentResult::new(experiment.header.clone(), target.shots, counts)
        };

        debug!("Experiment produced {} distinct outcomes", result.counts.len());
        Ok(result.with_seed(target.seed))
    }
}

/// Check the shape of raw memory and count outcomes by label.
fn histogram(program: &Program, memory: &[RawShot], shots: u32) -> HalResult<Counts> {
    if memory.len() != shots as usize {
        return Err(HalError::Protocol(format!(
            "requested {shots} shots, resource returned {}",
            memory.len()
        )));
    }
    let width = program.num_clbits();
    let mut counts = Counts::new();
    for (i, bits) in memory.iter().enumerate() {
        if bits.len() != width {
            return Err(HalError::Protocol(format!(
                "shot {i} has {} bits, expected {width}",
                bits.len()
            )));
        }
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(HalError::Protocol(format!(
                "shot {i} contains non-binary value {bad}"
            )));
        }
        counts.insert(hex_label(bits), 1);
    }
    Ok(counts)
}

/// Canonical outcome label: the memory read as an unsigned integer
/// (`bits[i]` has weight `2^i`), in lowercase hexadecimal with a `0x`
/// prefix and no zero-padding.
///
/// Any width is supported.
pub fn hex_label(bits: &[u8]) -> String {
    let digits: String = bits
        .chunks(4)
        .map(|nibble| {
            nibble
                .iter()
                .enumerate()
                .fold(0u32, |acc, (k, &b)| acc | (u32::from(b & 1) << k))
        })
        .rev()
        .skip_while(|&n| n == 0)
        .map(|n| char::from_digit(n, 16).unwrap_or('0'))
        .collect();

    if digits.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{digits}")
    }
}
