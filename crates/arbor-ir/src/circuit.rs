//! Circuit: a validated, ordered instruction list.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClassicalRegister, ClbitId, QubitId};

/// A quantum circuit.
///
/// Instructions are kept in program order. Every instruction is checked
/// against the circuit's qubit and classical-bit counts when appended, so
/// an execution resource can index amplitudes and memory without further
/// bounds checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits (memory slots).
    num_clbits: u32,
    /// Classical registers, in declaration order.
    cregs: Vec<ClassicalRegister>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a circuit with a given number of qubits and classical bits.
    ///
    /// The classical bits start out without a register; see
    /// [`Circuit::add_creg`].
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Declare a classical register over the next `size` classical bits.
    ///
    /// Registers are laid out contiguously in declaration order; the
    /// circuit grows its classical bit count if needed.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> ClassicalRegister {
        let offset = self.cregs.iter().map(|r| r.offset + r.size).max().unwrap_or(0);
        let reg = ClassicalRegister::new(name, offset, size);
        self.num_clbits = self.num_clbits.max(offset + size);
        self.cregs.push(reg.clone());
        reg
    }

    /// Name of the circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether every measurement comes after the last non-measurement
    /// instruction that acts on the same qubit or is classically
    /// conditioned.
    ///
    /// When true, the final state can be computed once and sampled for all
    /// shots.
    pub fn has_terminal_measurements(&self) -> bool {
        let mut measured: Vec<bool> = vec![false; self.num_qubits()];
        let mut any_measured = false;
        for inst in &self.instructions {
            match &inst.kind {
                InstructionKind::Measure => {
                    for q in &inst.qubits {
                        measured[q.0 as usize] = true;
                    }
                    any_measured = true;
                }
                InstructionKind::Barrier => {}
                InstructionKind::Gate(gate) if gate.condition.is_some() && any_measured => {
                    return false;
                }
                InstructionKind::Gate(_) | InstructionKind::Reset => {
                    if inst.qubits.iter().any(|q| measured[q.0 as usize]) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Append an instruction after validating its operands.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());

        for (i, q) in instruction.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: gate_name(),
                });
            }
            if !matches!(instruction.kind, InstructionKind::Barrier)
                && instruction.qubits[..i].contains(q)
            {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: gate_name(),
                });
            }
        }
        for c in &instruction.clbits {
            if c.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit: *c,
                    gate_name: gate_name(),
                });
            }
        }

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let got = instruction.qubits.len() as u32;
                if got != gate.num_qubits() {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_string(),
                        expected: gate.num_qubits(),
                        got,
                    });
                }
                if let Some(value) = gate.kind.parameters().into_iter().find(|p| !p.is_finite()) {
                    return Err(IrError::NonFiniteParameter {
                        gate_name: gate.name().to_string(),
                        value,
                    });
                }
                if let Some(cond) = &gate.condition {
                    if self.creg(&cond.register).is_none() {
                        return Err(IrError::UnknownRegister(cond.register.clone()));
                    }
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len()
                    || instruction.qubits.is_empty()
                {
                    return Err(IrError::MeasureArity {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                    });
                }
            }
            InstructionKind::Reset => {
                if instruction.qubits.len() != 1 {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: "reset".into(),
                        expected: 1,
                        got: instruction.qubits.len() as u32,
                    });
                }
            }
            InstructionKind::Barrier => {}
        }
        Ok(())
    }

    // =========================================================================
    // Builder shortcuts
    // =========================================================================

    /// Apply a gate to the given qubits.
    pub fn apply(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::H, [qubit]))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::X, [qubit]))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Rx(theta), [qubit]))
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CX, [control, target]))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CZ, [control, target]))
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    // =========================================================================
    // Common circuits
    // =========================================================================

    /// Bell-pair circuit over two qubits, both measured into register `c`.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("Bell", 2, 0);
        circuit.add_creg("c", 2);
        circuit.h(QubitId(0))?;
        circuit.cx(QubitId(0), QubitId(1))?;
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// GHZ circuit over `n` qubits, all measured.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("GHZ", n, 0);
        circuit.add_creg("c", n);
        if n > 0 {
            circuit.h(QubitId(0))?;
        }
        for i in 1..n {
            circuit.cx(QubitId(0), QubitId(i))?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }
}
