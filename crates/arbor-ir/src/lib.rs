//! Arbor Program Representation
//!
//! Experiments arrive in an interchange format and are translated into the
//! structures of this crate before they reach an execution resource. The
//! representation is deliberately flat: a [`Circuit`] is an ordered list of
//! validated [`Instruction`]s drawn from a fixed gate table
//! ([`StandardGate`]), and a [`Program`] binds a circuit to its
//! [`ExecutionTarget`].
//!
//! Nothing here is ever rendered to source text and compiled at runtime.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use arbor_ir::{Circuit, ExecutionTarget, Program, QubitId};
//!
//! let mut circuit = Circuit::with_size("Bell", 2, 0);
//! circuit.add_creg("c", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let program = Program::new(circuit, ExecutionTarget::new(256).with_seed(Some(11)));
//! assert_eq!(program.num_qubits(), 2);
//! assert!(program.circuit.has_terminal_measurements());
//! ```
//!
//! # Coordinate conventions
//!
//! Qubit `k` is bit `k` of a basis-state index (qubit 0 is least
//! significant). Classical bit `i` carries weight `2^i` when a measurement
//! record is read as an integer.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod program;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use program::{ExecutionTarget, Program, STATEVECTOR_RESOURCE};
pub use qubit::{ClassicalRegister, ClbitId, QubitId};
