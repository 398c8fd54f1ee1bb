//! Arbor emulated lattice resource.
//!
//! [`EmulatedResource`] implements [`RemoteResource`](arbor_hal::RemoteResource)
//! with a local statevector engine. It supports mid-circuit measurement,
//! reset and classically conditioned gates, seeds its sampler from the
//! program's execution target, and models a single-process resource by
//! rejecting calls beyond its concurrency limit.
//!
//! # Example
//!
//! ```rust
//! use arbor_adapter_sim::EmulatedResource;
//! use arbor_hal::RemoteResource;
//! use arbor_ir::{Circuit, ExecutionTarget, Program};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let program = Program::new(Circuit::bell().unwrap(), ExecutionTarget::new(100).with_seed(Some(1)));
//! let shots = EmulatedResource::new().run(&program, 100).await.unwrap();
//! assert!(shots.iter().all(|s| s[0] == s[1]));
//! # }
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, DEFAULT_NAME, EmulatedResource};
pub use statevector::Statevector;
