//! Translation of experiment descriptions into Arbor programs.
//!
//! [`QobjTranslator`] maps each named instruction of an
//! [`Experiment`](arbor_hal::Experiment) through a fixed gate table into
//! the structured [`Program`](arbor_ir::Program) representation. Nothing
//! is rendered to text or evaluated at runtime.
//!
//! # Example
//!
//! ```rust
//! use arbor_hal::{Experiment, ExperimentInstruction, Translator};
//! use arbor_ir::ExecutionTarget;
//! use arbor_translate::QobjTranslator;
//!
//! let bell = Experiment::new("Bell", 2, [("c", 2)])
//!     .push(ExperimentInstruction::gate("h", [0]))
//!     .push(ExperimentInstruction::gate("cx", [0, 1]))
//!     .push(ExperimentInstruction::measure(0, 0))
//!     .push(ExperimentInstruction::measure(1, 1));
//!
//! let program = QobjTranslator::new()
//!     .translate(&bell, &ExecutionTarget::new(1024))
//!     .unwrap();
//! assert_eq!(program.num_qubits(), 2);
//! ```

mod error;
mod translator;

pub use error::{TranslateError, TranslateResult};
pub use translator::QobjTranslator;
