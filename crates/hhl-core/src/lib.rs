//! `hhl-core` — the HHL quantum linear-system solver.
//!
//! Given a matrix `A` and vector `b`, the solver builds a circuit that loads
//! `b`, estimates the eigenphases of `A`, rotates an ancilla by `C/λ`,
//! un-computes the estimation, and reads an approximation of `A⁻¹b` back
//! out of the execution result:
//!
//! - **Preprocessing** ([`ValidatedProblem`]): forces `A` to be Hermitian and
//!   of power-of-two dimension, embedding or padding it when enabled.
//! - **Composition** ([`CircuitComposer`]): sequences the pluggable engines
//!   ([`components`]) resolved by name through a [`ComponentRegistry`].
//! - **Extraction** ([`extract`]): decodes amplitudes from a statevector
//!   backend or runs postselected state tomography on a counting backend,
//!   then rescales magnitude and phase.
//!
//! # Quick start
//!
//! ```rust
//! use hhl_core::{ComponentRegistry, Hhl, HhlConfig, LinearSystemInput};
//! use hhl_adapter_sim::SimulatorBackend;
//!
//! # tokio_test_block(async {
//! let input = LinearSystemInput::real(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![1.0, 0.0]);
//! let mut config = HhlConfig::default();
//! config.eigs.num_ancillae = 3;
//! config.eigs.evo_time = Some(std::f64::consts::FRAC_PI_2);
//!
//! let hhl = Hhl::from_config(Some(&input), &config, &ComponentRegistry::default()).unwrap();
//! let solution = hhl.run(&SimulatorBackend::statevector()).await.unwrap();
//! assert!((solution.solution()[0].re - 1.0).abs() < 1e-6);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod components;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evolution;
pub mod extract;
pub mod hamiltonian;
pub mod hhl;
pub mod linalg;
pub mod problem;
pub mod qft;
pub mod registry;
pub mod result;

#[cfg(test)]
pub(crate) mod testing;

pub use compose::{CircuitComposer, HhlCircuit};
pub use config::{ConfigError, HhlConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, NullSink, TracingSink};
pub use error::{HhlError, HhlResult};
pub use hhl::Hhl;
pub use linalg::{Matrix, Vector};
pub use problem::{Entry, LinearSystemInput, ValidatedProblem};
pub use registry::{ComponentRegistry, Components};
pub use result::{HhlSolution, ProbabilityResult};
