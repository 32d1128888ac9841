//! Reciprocal rotation from a precomputed angle table.
//!
//! For every value `k` of the eigenvalue register the ancilla is rotated by
//! `RY(θ_k)` with `sin(θ_k/2) = C/λ_k`, so the success branch carries
//! amplitude proportional to `1/λ`. The table is applied as one
//! uniformly-controlled `RY`, decomposed into `2^n` rotations and `2^n`
//! CNOTs along a Gray-code walk over the control values.

use std::f64::consts::PI;

use hhl_ir::{Circuit, QuantumRegister, QubitId};
use num_complex::Complex64;
use tracing::debug;

use super::{ReciprocalRotator, ensure_fresh_register};
use crate::error::{HhlError, HhlResult};
use crate::linalg::Vector;

/// Register name of the success ancilla.
pub const ANCILLA_REGISTER: &str = "anc";

/// Lookup-table reciprocal rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRotation {
    negative_evals: bool,
    evo_time: f64,
    scale: f64,
}

impl LookupRotation {
    /// Configure with the estimator's sign convention and evolution time.
    ///
    /// `scale` is the constant `C`; `0` selects the smallest eigenvalue the
    /// register resolves.
    pub fn new(negative_evals: bool, evo_time: f64, scale: f64) -> Self {
        Self {
            negative_evals,
            evo_time,
            scale,
        }
    }

    /// Eigenvalue encoded by register value `k`.
    pub fn eigenvalue(&self, k: usize, num_a: usize) -> f64 {
        let size = 1usize << num_a;
        let signed = if self.negative_evals && k >= size / 2 {
            k as f64 - size as f64
        } else {
            k as f64
        };
        signed * self.resolution(num_a)
    }

    /// Rotation angle per register value.
    pub fn angles(&self, num_a: usize) -> Vec<f64> {
        let c = if self.scale > 0.0 {
            self.scale
        } else {
            self.resolution(num_a)
        };
        (0..1usize << num_a)
            .map(|k| {
                let lambda = self.eigenvalue(k, num_a);
                if lambda == 0.0 {
                    0.0
                } else {
                    2.0 * (c / lambda).clamp(-1.0, 1.0).asin()
                }
            })
            .collect()
    }

    fn resolution(&self, num_a: usize) -> f64 {
        2.0 * PI / (self.evo_time * (1usize << num_a) as f64)
    }
}

impl ReciprocalRotator for LookupRotation {
    fn name(&self) -> &str {
        "lookup"
    }

    fn build(&self, base: &Circuit, eigen: &QuantumRegister) -> HhlResult<(Circuit, QubitId)> {
        if eigen.is_empty() {
            return Err(HhlError::Component(
                "reciprocal rotation needs a non-empty eigenvalue register".to_string(),
            ));
        }
        ensure_fresh_register(base, ANCILLA_REGISTER)?;

        let mut circuit = base.empty_like("reciprocal");
        let anc = circuit.add_qreg(ANCILLA_REGISTER, 1);
        let target = anc.qubits()[0];

        let angles = self.angles(eigen.len());
        debug!(controls = eigen.len(), "building lookup rotation");
        uniformly_controlled_ry(&mut circuit, eigen.qubits(), target, &angles)?;

        Ok((circuit, target))
    }

    fn decode_statevector(
        &self,
        amplitudes: &[Complex64],
        num_io_qubits: usize,
    ) -> HhlResult<Vector> {
        let half = amplitudes.len() / 2;
        let width = 1usize << num_io_qubits;
        if !amplitudes.len().is_power_of_two() || half + width > amplitudes.len() {
            return Err(HhlError::Component(format!(
                "statevector of length {} cannot hold {num_io_qubits} io qubits and an ancilla",
                amplitudes.len()
            )));
        }
        Ok(amplitudes[half..half + width].iter().copied().collect())
    }
}

/// Append `RY(angles[k])` on `target` for control value `k`.
///
/// `angles.len()` must be `2^controls.len()`.
fn uniformly_controlled_ry(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    angles: &[f64],
) -> HhlResult<()> {
    let n = controls.len();
    let size = 1usize << n;
    debug_assert_eq!(angles.len(), size);

    for i in 0..size {
        let gray = i ^ (i >> 1);
        let alpha = angles
            .iter()
            .enumerate()
            .map(|(k, theta)| {
                if (k & gray).count_ones() % 2 == 0 {
                    *theta
                } else {
                    -theta
                }
            })
            .sum::<f64>()
            / size as f64;
        circuit.ry(alpha, target)?;

        let control = if i + 1 == size {
            n - 1
        } else {
            (i + 1).trailing_zeros() as usize
        };
        circuit.cx(controls[control], target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{basis_index, simulate};

    #[test]
    fn test_angles_positive() {
        // resolution 2π/(π/2·8) = 0.5
        let rot = LookupRotation::new(false, PI / 2.0, 0.0);
        let angles = rot.angles(3);
        assert_eq!(angles[0], 0.0);
        assert!((angles[1] - PI).abs() < 1e-12);
        assert!(((angles[2] / 2.0).sin() - 0.5).abs() < 1e-12);
        assert!(((angles[4] / 2.0).sin() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_angles_negative_and_scale() {
        let rot = LookupRotation::new(true, PI / 4.0, 0.0);
        assert_eq!(rot.eigenvalue(7, 3), -1.0);
        assert_eq!(rot.eigenvalue(3, 3), 3.0);
        let angles = rot.angles(3);
        assert!((angles[7] + PI).abs() < 1e-12);

        let scaled = LookupRotation::new(false, PI / 2.0, 0.25);
        assert!(((scaled.angles(3)[1] / 2.0).sin() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_uniformly_controlled_ry_matches_table() {
        let rot = LookupRotation::new(false, PI / 2.0, 0.0);
        let angles = rot.angles(3);

        for k in 0..8 {
            let mut base = Circuit::new("hhl");
            let eigs = base.add_qreg("eigs", 3);
            for (bit, &q) in eigs.qubits().iter().enumerate() {
                if (k >> bit) & 1 == 1 {
                    base.x(q).unwrap();
                }
            }
            let (circuit, anc) = rot.build(&base, &eigs).unwrap();
            assert_eq!(circuit.dag().count_ops().get("ry"), Some(&8));
            base.compose(&circuit).unwrap();

            let sv = simulate(&base);
            let anc_reg = base.qreg(ANCILLA_REGISTER).unwrap();
            assert_eq!(anc_reg.qubits(), &[anc]);
            let one = sv[basis_index(&[(&eigs, k), (anc_reg, 1)])];
            let zero = sv[basis_index(&[(&eigs, k), (anc_reg, 0)])];
            let half = angles[k] / 2.0;
            assert!((one.re - half.sin()).abs() < 1e-9, "k={k}");
            assert!((zero.re - half.cos()).abs() < 1e-9, "k={k}");
        }
    }

    #[test]
    fn test_decode_statevector_slice() {
        let rot = LookupRotation::new(false, 1.0, 0.0);
        let sv: Vec<Complex64> = (0..16).map(|i| Complex64::new(f64::from(i), 0.0)).collect();
        let decoded = rot.decode_statevector(&sv, 2).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[0], Complex64::new(8.0, 0.0));
        assert!(rot.decode_statevector(&sv[..3], 1).is_err());
    }
}
