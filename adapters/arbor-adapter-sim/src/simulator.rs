//! Emulated execution resource.

use async_trait::async_trait;
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use arbor_hal::{HalError, HalResult, RawShot, RemoteResource};
use arbor_ir::{Circuit, ClbitId, Gate, Instruction, InstructionKind, Program};

use crate::statevector::{Statevector, sample_index};

/// Default resource name.
pub const DEFAULT_NAME: &str = "qvm";

/// Default qubit limit.
pub const DEFAULT_MAX_QUBITS: usize = 32;

/// Local statevector emulator of a lattice resource.
///
/// Like the process it stands in for, the emulator tolerates a fixed
/// number of concurrent calls (one by default). A call made while that
/// many are in flight fails with [`HalError::RemoteExecution`] instead of
/// queueing.
pub struct EmulatedResource {
    name: String,
    max_qubits: usize,
    max_concurrent: usize,
    in_flight: Arc<AtomicUsize>,
}

impl EmulatedResource {
    /// Create an emulator with default settings.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            max_qubits: DEFAULT_MAX_QUBITS,
            max_concurrent: 1,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the resource name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the qubit limit.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set how many calls may run at once.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Calls currently executing.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> HalResult<InFlight> {
        let previous = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        if previous >= self.max_concurrent {
            warn!(
                resource = %self.name,
                in_flight = previous + 1,
                "Concurrent access beyond limit of {}",
                self.max_concurrent
            );
            return Err(HalError::RemoteExecution(format!(
                "{}: state corrupted by concurrent access ({} calls in flight, limit {})",
                self.name,
                previous + 1,
                self.max_concurrent
            )));
        }
        Ok(guard)
    }

    fn check_size(&self, program: &Program) -> HalResult<()> {
        if program.num_qubits() > self.max_qubits {
            return Err(HalError::RemoteExecution(format!(
                "Program has {} qubits but {} only supports {}",
                program.num_qubits(),
                self.name,
                self.max_qubits
            )));
        }
        Ok(())
    }
}

impl Default for EmulatedResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter on drop.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteResource for EmulatedResource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, program), fields(resource = %self.name, program = %program.circuit.name()))]
    async fn run(&self, program: &Program, shots: u32) -> HalResult<Vec<RawShot>> {
        let _guard = self.enter()?;
        self.check_size(program)?;

        let program = program.clone();
        tokio::task::spawn_blocking(move || sample_shots(&program, shots))
            .await
            .map_err(|e| HalError::RemoteExecution(format!("emulator worker failed: {e}")))
    }

    #[instrument(skip(self, program), fields(resource = %self.name, program = %program.circuit.name()))]
    async fn amplitudes(&self, program: &Program) -> HalResult<Vec<Complex64>> {
        let _guard = self.enter()?;
        self.check_size(program)?;

        let program = program.clone();
        tokio::task::spawn_blocking(move || final_state(&program).into_amplitudes())
            .await
            .map_err(|e| HalError::RemoteExecution(format!("emulator worker failed: {e}")))
    }
}

fn rng_for(program: &Program) -> StdRng {
    program
        .target
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Whether one evolution can be sampled for every shot.
fn is_sampleable(circuit: &Circuit) -> bool {
    circuit.has_terminal_measurements()
        && !circuit
            .instructions()
            .iter()
            .any(|i| matches!(i.kind, InstructionKind::Reset))
}

fn sample_shots(program: &Program, shots: u32) -> Vec<RawShot> {
    let start = Instant::now();
    let circuit = &program.circuit;
    let mut rng = rng_for(program);
    debug!(
        "Starting emulation: {} qubits, {} shots",
        circuit.num_qubits(),
        shots
    );

    let memory = if is_sampleable(circuit) {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut measured: Vec<(usize, usize)> = Vec::new();
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => apply_gate(&mut sv, circuit, gate, inst, &[]),
                InstructionKind::Measure => measured.extend(
                    inst.qubits
                        .iter()
                        .zip(&inst.clbits)
                        .map(|(q, c)| (q.0 as usize, c.0 as usize)),
                ),
                InstructionKind::Reset | InstructionKind::Barrier => {}
            }
        }
        let cumulative = sv.cumulative_probabilities();
        (0..shots)
            .map(|_| {
                let outcome = sample_index(&cumulative, &mut rng);
                let mut bits = vec![0u8; circuit.num_clbits()];
                for &(q, c) in &measured {
                    bits[c] = u8::from(outcome & (1 << q) != 0);
                }
                bits
            })
            .collect()
    } else {
        (0..shots)
            .map(|_| run_trajectory(circuit, &mut rng).1)
            .collect()
    };

    debug!("Emulation completed in {:?}", start.elapsed());
    memory
}

/// Final state for amplitude collection. Terminal measurements leave the
/// state untouched; mid-circuit ones collapse it along one seeded
/// trajectory.
fn final_state(program: &Program) -> Statevector {
    let circuit = &program.circuit;
    if is_sampleable(circuit) {
        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                apply_gate(&mut sv, circuit, gate, inst, &[]);
            }
        }
        sv
    } else {
        run_trajectory(circuit, &mut rng_for(program)).0
    }
}

/// One shot with collapse on every measurement and reset.
fn run_trajectory(circuit: &Circuit, rng: &mut StdRng) -> (Statevector, RawShot) {
    let mut sv = Statevector::new(circuit.num_qubits());
    let mut bits = vec![0u8; circuit.num_clbits()];
    for inst in circuit.instructions() {
        match &inst.kind {
            InstructionKind::Gate(gate) => apply_gate(&mut sv, circuit, gate, inst, &bits),
            InstructionKind::Measure => {
                for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                    bits[c.0 as usize] = sv.measure(q.0 as usize, rng);
                }
            }
            InstructionKind::Reset => {
                for q in &inst.qubits {
                    sv.reset(q.0 as usize, rng);
                }
            }
            InstructionKind::Barrier => {}
        }
    }
    (sv, bits)
}

/// Apply `gate` unless its classical condition fails against `bits`.
/// Memory not yet written reads as zero.
fn apply_gate(
    sv: &mut Statevector,
    circuit: &Circuit,
    gate: &Gate,
    inst: &Instruction,
    bits: &[u8],
) {
    let fires = gate.condition.as_ref().is_none_or(|cond| {
        circuit
            .creg(&cond.register)
            .is_some_and(|reg| register_value(bits, reg.clbits()) == cond.value)
    });
    if fires {
        let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.0 as usize).collect();
        sv.apply_gate(&gate.kind, &qubits);
    }
}

/// Register value with its first clbit as the least significant bit.
fn register_value(bits: &[u8], clbits: impl Iterator<Item = ClbitId>) -> u64 {
    clbits
        .enumerate()
        .filter(|(_, c)| bits.get(c.0 as usize).copied() == Some(1))
        .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
}
