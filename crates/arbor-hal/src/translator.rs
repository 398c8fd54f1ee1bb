//! The translation collaborator.

use arbor_ir::{ExecutionTarget, Program};

use crate::error::HalResult;
use crate::experiment::Experiment;

/// Turns an inbound experiment into an executable [`Program`].
///
/// Translation is pure: the same experiment and target always produce the
/// same program. Malformed input fails with
/// [`HalError::Translation`](crate::error::HalError::Translation).
pub trait Translator: Send + Sync {
    /// Translate `experiment` for execution on `target`.
    fn translate(&self, experiment: &Experiment, target: &ExecutionTarget) -> HalResult<Program>;
}

impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    fn translate(&self, experiment: &Experiment, target: &ExecutionTarget) -> HalResult<Program> {
        (**self).translate(experiment, target)
    }
}
