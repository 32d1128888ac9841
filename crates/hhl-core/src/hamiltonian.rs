//! Pauli decomposition of Hermitian matrices.
//!
//! A Hermitian matrix on `n` qubits is a sum of weighted Pauli strings:
//!
//!   A = Σ_k  c_k · P_k,   c_k = Tr(P_k · A) / 2^n
//!
//! with every P_k a tensor product of I, X, Y, Z and every c_k real. Qubit `q` of a string acts on bit `q` of the
//! matrix index.
//!
//! # Example
//!
//! ```rust
//! use hhl_core::hamiltonian::{Hamiltonian, PauliOp};
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! // diag(1, 2) = 1.5·I - 0.5·Z
//! let one = Complex64::new(1.0, 0.0);
//! let zero = Complex64::new(0.0, 0.0);
//! let a = array![[one, zero], [zero, one * 2.0]];
//! let h = Hamiltonian::from_matrix(&a);
//! assert_eq!(h.n_terms(), 2);
//! assert_eq!(h.terms()[1].pauli.ops(), &[(0, PauliOp::Z)]);
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::linalg::Matrix;

/// Coefficients at or below this magnitude are dropped.
pub const COEFF_CUTOFF: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    I,
    X,
    Y,
    Z,
}

impl PauliOp {
    /// Decode from the `(x, z)` symplectic bits.
    fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => PauliOp::I,
            (true, false) => PauliOp::X,
            (true, true) => PauliOp::Y,
            (false, true) => PauliOp::Z,
        }
    }
}

/// Pauli factors on the qubits they do not leave alone.
///
/// Factors are kept in qubit order; unlisted qubits carry I.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauliString {
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// Collect `(qubit, op)` factors, dropping identities.
    pub fn from_ops(factors: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut ops: Vec<_> = factors
            .into_iter()
            .filter(|&(_, op)| op != PauliOp::I)
            .collect();
        ops.sort_unstable_by_key(|&(q, _)| q);
        Self { ops }
    }

    /// Build from X and Z bit masks (`x=1,z=1` is Y).
    pub fn from_masks(x_mask: usize, z_mask: usize, n_qubits: u32) -> Self {
        Self::from_ops((0..n_qubits).map(|q| {
            (
                q,
                PauliOp::from_bits(x_mask >> q & 1 == 1, z_mask >> q & 1 == 1),
            )
        }))
    }

    /// Non-identity factors in qubit order.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// X and Z bit masks.
    pub fn masks(&self) -> (usize, usize) {
        self.ops.iter().fold((0, 0), |(x, z), (q, op)| {
            let bit = 1usize << q;
            match op {
                PauliOp::I => (x, z),
                PauliOp::X => (x | bit, z),
                PauliOp::Y => (x | bit, z | bit),
                PauliOp::Z => (x, z | bit),
            }
        })
    }

    /// The entry `P[col ^ x_mask, col]`, the only non-zero in column `col`.
    pub fn column_entry(&self, col: usize) -> (usize, Complex64) {
        let (x_mask, z_mask) = self.masks();
        (col ^ x_mask, pauli_phase(x_mask, z_mask, col))
    }
}

/// Phase of `P|col⟩` for `P = i^{#Y} X^x Z^z`.
pub(crate) fn pauli_phase(x_mask: usize, z_mask: usize, col: usize) -> Complex64 {
    let n_y = (x_mask & z_mask).count_ones();
    let i_pow = match n_y % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    };
    if (col & z_mask).count_ones() % 2 == 1 {
        -i_pow
    } else {
        i_pow
    }
}

/// `coeff · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianTerm {
    pub coeff: f64,
    pub pauli: PauliString,
}

impl HamiltonianTerm {
    pub fn new(coeff: f64, pauli: PauliString) -> Self {
        Self { coeff, pauli }
    }

    /// The same string with coefficient scaled by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.coeff * factor, self.pauli.clone())
    }
}

/// A sum-of-Pauli-strings operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian {
    terms: Vec<HamiltonianTerm>,
    n_qubits: u32,
}

impl Hamiltonian {
    /// Create from a list of terms on `n_qubits` qubits.
    pub fn from_terms(terms: Vec<HamiltonianTerm>, n_qubits: u32) -> Self {
        Self { terms, n_qubits }
    }

    /// Decompose a Hermitian `2^n x 2^n` matrix.
    ///
    /// Terms are ordered by `(z_mask, x_mask)` ascending, so the identity
    /// comes first. The imaginary part of each coefficient is discarded.
    pub fn from_matrix(matrix: &Matrix) -> Self {
        let dim = matrix.nrows();
        let n_qubits = dim.trailing_zeros();
        let mut terms = Vec::new();

        for z_mask in 0..dim {
            for x_mask in 0..dim {
                // Tr(P·A) = Σ_j P[j^x, j] · A[j, j^x]
                let trace: Complex64 = (0..dim)
                    .map(|j| pauli_phase(x_mask, z_mask, j) * matrix[[j, j ^ x_mask]])
                    .sum();
                let coeff = trace.re / dim as f64;
                if coeff.abs() > COEFF_CUTOFF {
                    terms.push(HamiltonianTerm::new(
                        coeff,
                        PauliString::from_masks(x_mask, z_mask, n_qubits),
                    ));
                }
            }
        }

        Self { terms, n_qubits }
    }

    pub fn terms(&self) -> &[HamiltonianTerm] {
        &self.terms
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Number of qubits the operator acts on.
    pub fn n_qubits(&self) -> u32 {
        self.n_qubits
    }

    /// `Σ |c_k|`, an upper bound on the spectral norm.
    pub fn lambda(&self) -> f64 {
        self.terms.iter().fold(0.0, |acc, t| acc + t.coeff.abs())
    }

    /// Every coefficient multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|t| t.scaled(factor)).collect(),
            n_qubits: self.n_qubits,
        }
    }

    /// Rebuild the dense matrix `Σ c_k P_k`.
    pub fn to_matrix(&self) -> Matrix {
        let dim = 1usize << self.n_qubits;
        let mut m = Matrix::zeros((dim, dim));
        for term in &self.terms {
            for col in 0..dim {
                let (row, phase) = term.pauli.column_entry(col);
                m[[row, col]] += phase * term.coeff;
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::allclose;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_pauli_y_entries() {
        let y = PauliString::from_ops([(0, PauliOp::Y)]);
        // Y|0> = i|1>, Y|1> = -i|0>
        assert_eq!(y.column_entry(0), (1, c(0.0, 1.0)));
        assert_eq!(y.column_entry(1), (0, c(0.0, -1.0)));
    }

    #[test]
    fn test_decompose_two_by_two() {
        // [[1, .5], [.5, 1]] = I + 0.5 X
        let a = array![[c(1.0, 0.0), c(0.5, 0.0)], [c(0.5, 0.0), c(1.0, 0.0)]];
        let h = Hamiltonian::from_matrix(&a);
        assert_eq!(h.n_terms(), 2);
        assert!(h.terms()[0].pauli.is_identity());
        assert!((h.terms()[0].coeff - 1.0).abs() < 1e-12);
        assert_eq!(h.terms()[1].pauli.ops(), &[(0, PauliOp::X)]);
        assert!((h.lambda() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_decompose_roundtrip_complex() {
        let a = array![
            [c(2.0, 0.0), c(0.0, -1.0), c(0.3, 0.0), c(0.0, 0.0)],
            [c(0.0, 1.0), c(1.0, 0.0), c(0.0, 0.0), c(0.1, 0.2)],
            [c(0.3, 0.0), c(0.0, 0.0), c(-1.0, 0.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(0.1, -0.2), c(0.0, 0.0), c(0.5, 0.0)],
        ];
        let h = Hamiltonian::from_matrix(&a);
        assert_eq!(h.n_qubits(), 2);
        assert!(allclose(&h.to_matrix(), &a));
    }

    #[test]
    fn test_scaled_negates() {
        let h = Hamiltonian::from_terms(
            vec![HamiltonianTerm::new(0.5, PauliString::from_ops([(0, PauliOp::Z)]))],
            1,
        );
        let neg = h.scaled(-1.0);
        assert_eq!(neg.terms()[0].coeff, -0.5);
        assert_eq!(neg.lambda(), h.lambda());
    }
}
