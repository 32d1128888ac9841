//! Amplitude loading with a single custom unitary.

use hhl_ir::{Circuit, CustomGate, QuantumRegister};
use num_complex::Complex64;

use super::StatePreparer;
use crate::error::{HhlError, HhlResult};
use crate::linalg::{Vector, norm};

const ZERO_NORM: f64 = 1e-12;

/// Prepares an arbitrary vector with one `state_prep` gate.
///
/// The gate is a phase-adjusted Householder reflection whose first column
/// is the normalized target, so it maps `|0…0⟩` onto it exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomState;

impl CustomState {
    /// Create the preparer.
    pub fn new() -> Self {
        Self
    }
}

impl StatePreparer for CustomState {
    fn name(&self) -> &str {
        "custom"
    }

    fn build(
        &self,
        base: &Circuit,
        register: &QuantumRegister,
        amplitudes: &Vector,
    ) -> HhlResult<Circuit> {
        let dim = 1usize << register.len();
        if amplitudes.len() != dim {
            return Err(HhlError::Component(format!(
                "register '{}' holds {dim} amplitudes, got {}",
                register.name(),
                amplitudes.len()
            )));
        }
        let matrix = preparation_unitary(amplitudes)?;
        let gate = CustomGate::unitary("state_prep", register.len() as u32, matrix)?;

        let mut circuit = base.empty_like("state_prep");
        circuit.gate(gate, register.qubits().iter().copied())?;
        Ok(circuit)
    }
}

/// Row-major unitary with first column `v/‖v‖`.
fn preparation_unitary(v: &Vector) -> HhlResult<Vec<Complex64>> {
    let length = norm(v);
    if length <= ZERO_NORM {
        return Err(HhlError::Component(
            "cannot prepare the zero vector".to_string(),
        ));
    }
    let dim = v.len();

    // w = e^{-iφ} v/‖v‖ has a real, non-negative first entry
    let phase = Complex64::from_polar(1.0, v[0].arg());
    let w: Vec<Complex64> = v.iter().map(|z| z / (phase * length)).collect();

    let mut u: Vec<Complex64> = w.iter().map(|z| -z).collect();
    u[0] += 1.0;
    let u_norm_sqr: f64 = u.iter().map(Complex64::norm_sqr).sum();

    let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];
    for row in 0..dim {
        for col in 0..dim {
            let identity = if row == col { 1.0 } else { 0.0 };
            let reflection = if u_norm_sqr > ZERO_NORM {
                u[row] * u[col].conj() * (2.0 / u_norm_sqr)
            } else {
                Complex64::new(0.0, 0.0)
            };
            matrix[row * dim + col] = phase * (Complex64::new(identity, 0.0) - reflection);
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::simulate;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn prepare(v: &Vector) -> Vec<Complex64> {
        let mut base = Circuit::new("prep");
        let io = base.add_qreg("io", v.len().trailing_zeros());
        let circuit = CustomState::new().build(&base, &io, v).unwrap();
        assert_eq!(circuit.size(), 1);
        simulate(&circuit)
    }

    #[test]
    fn test_prepares_normalized_target() {
        let v = array![c(1.0, 0.0), c(0.0, 2.0), c(-1.0, 0.0), c(0.5, 0.5)];
        let sv = prepare(&v);
        let n = norm(&v);
        for (got, want) in sv.iter().zip(v.iter()) {
            assert!((got - want / n).norm() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn test_basis_state_and_global_phase() {
        let sv = prepare(&array![c(0.0, 3.0), c(0.0, 0.0)]);
        assert!((sv[0] - c(0.0, 1.0)).norm() < 1e-12);
        assert!(sv[1].norm() < 1e-12);

        let sv = prepare(&array![c(0.0, 0.0), c(1.0, 0.0)]);
        assert!((sv[1] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_unitary_columns_orthonormal() {
        let v = array![c(0.3, -0.1), c(0.2, 0.4)];
        let m = preparation_unitary(&v).unwrap();
        for a in 0..2 {
            for b in 0..2 {
                let dot: Complex64 = (0..2).map(|r| m[r * 2 + a].conj() * m[r * 2 + b]).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - c(expected, 0.0)).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut base = Circuit::new("prep");
        let io = base.add_qreg("io", 1);
        let prep = CustomState::new();
        assert!(prep.build(&base, &io, &array![c(0.0, 0.0), c(0.0, 0.0)]).is_err());
        assert!(prep.build(&base, &io, &array![c(1.0, 0.0)]).is_err());
    }
}
