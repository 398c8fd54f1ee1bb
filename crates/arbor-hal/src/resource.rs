//! The execution resource collaborator.
//!
//! A [`RemoteResource`] runs a translated [`Program`] and returns raw
//! classical memory, one bit vector per shot. How it connects to the
//! processor or emulator is its own concern.
//!
//! | Method | Kind | Returns |
//! |--------|------|---------|
//! | `name()` | sync | `&str` |
//! | `run()` | async | `HalResult<Vec<RawShot>>` |
//! | `amplitudes()` | async | `HalResult<Vec<Complex64>>` |
//!
//! Some resources are single-process: concurrent calls corrupt their
//! state. Callers bound concurrency with a limiter; resources may report
//! a violation as [`HalError::RemoteExecution`].
//!
//! [`HalError::RemoteExecution`]: crate::error::HalError::RemoteExecution

use arbor_ir::Program;
use async_trait::async_trait;
use num_complex::Complex64;

use crate::error::HalResult;

/// Classical memory of one shot: `shot[i]` is the value (0 or 1) of
/// clbit `i`.
pub type RawShot = Vec<u8>;

/// An execution resource that runs programs.
#[async_trait]
pub trait RemoteResource: Send + Sync {
    /// Name of the resource.
    fn name(&self) -> &str;

    /// Run `program` for `shots` shots, returning one memory vector per
    /// shot, each `program.num_clbits()` long.
    async fn run(&self, program: &Program, shots: u32) -> HalResult<Vec<RawShot>>;

    /// Final amplitudes of `program`, `2^num_qubits` long, with
    /// measurements treated as collapse points.
    async fn amplitudes(&self, program: &Program) -> HalResult<Vec<Complex64>>;
}
