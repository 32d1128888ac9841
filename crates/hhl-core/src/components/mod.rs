//! Pluggable engines of the solver.
//!
//! Each engine kind is a capability trait. Concrete engines are chosen by
//! name through the [`ComponentRegistry`](crate::registry::ComponentRegistry)
//! once, when the solver is configured, and then handed to the
//! [`CircuitComposer`](crate::compose::CircuitComposer) explicitly.
//!
//! All engines build their sub-circuits on an
//! [`empty_like`](hhl_ir::Circuit::empty_like) copy of the circuit they
//! extend, so new registers draw ids from the same counter and
//! [`compose`](hhl_ir::Circuit::compose) needs no remapping.

use std::fmt::Debug;

use hhl_hal::ExecutionResult;
use hhl_ir::{Circuit, QuantumRegister, QubitId};
use num_complex::Complex64;

use crate::error::{HhlError, HhlResult};
use crate::linalg::{Matrix, Vector};

pub mod eigs;
pub mod init_state;
pub mod reciprocal;
pub mod tomography;

pub use eigs::QpeEigenvalues;
pub use init_state::CustomState;
pub use reciprocal::LookupRotation;
pub use tomography::{LinearInversionFitter, TomographyBasis, state_tomography_circuits};

/// Phase estimation of the system matrix.
pub trait EigenvalueEstimator: Send + Sync + Debug {
    /// Engine name.
    fn name(&self) -> &str;

    /// `(num_q, num_a)`: io register and eigenvalue register widths.
    fn register_sizes(&self) -> (usize, usize);

    /// Whether eigenvalues are read as two's-complement signed values.
    fn negative_evals(&self) -> bool;

    /// Evolution time of the least significant control.
    fn evo_time(&self) -> f64;

    /// Build the forward estimation on `io`.
    ///
    /// Returns the sub-circuit and the freshly allocated eigenvalue register.
    fn build_forward(
        &self,
        base: &Circuit,
        io: &QuantumRegister,
    ) -> HhlResult<(Circuit, QuantumRegister)>;

    /// Un-compute a circuit returned by [`build_forward`](Self::build_forward).
    fn build_inverse(
        &self,
        forward: &Circuit,
        input: &QuantumRegister,
        output: &QuantumRegister,
    ) -> HhlResult<Circuit>;
}

/// Loads a vector into the amplitudes of a register.
pub trait StatePreparer: Send + Sync + Debug {
    /// Engine name.
    fn name(&self) -> &str;

    /// Build a sub-circuit taking `register` from `|0⟩` to `amplitudes/‖amplitudes‖`.
    fn build(
        &self,
        base: &Circuit,
        register: &QuantumRegister,
        amplitudes: &Vector,
    ) -> HhlResult<Circuit>;
}

/// Encodes `1/λ` into the amplitude of an ancilla.
pub trait ReciprocalRotator: Send + Sync + Debug {
    /// Engine name.
    fn name(&self) -> &str;

    /// Build the rotation controlled by `eigen`, returning the ancilla.
    fn build(&self, base: &Circuit, eigen: &QuantumRegister) -> HhlResult<(Circuit, QubitId)>;

    /// Read the io amplitudes of the success branch out of a full statevector.
    fn decode_statevector(&self, amplitudes: &[Complex64], num_io_qubits: usize)
    -> HhlResult<Vector>;
}

/// Reconstructs a density matrix from tomography counts.
pub trait TomographyFitter: Send + Sync + Debug {
    /// Engine name.
    fn name(&self) -> &str;

    /// Fit `records`, whose experiments are named after `circuits`.
    fn fit(&self, records: &ExecutionResult, circuits: &[Circuit]) -> HhlResult<Matrix>;
}

/// Fail when `base` already holds a register called `name`.
pub(crate) fn ensure_fresh_register(base: &Circuit, name: &str) -> HhlResult<()> {
    if base.qreg(name).is_some() {
        return Err(HhlError::Component(format!(
            "circuit '{}' already has a register named '{name}'",
            base.name()
        )));
    }
    Ok(())
}
