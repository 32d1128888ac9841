//! Controlled product-formula time evolution.
//!
//! Appends a controlled approximation of `exp(-i H t)` by splitting the
//! evolution into `slices` repetitions of one product-formula slice.
//!
//! # First-order Trotter (Lie-Trotter)
//!
//!   exp(-i H t) ≈ [∏_k exp(-i c_k P_k t/n)]^n
//!
//! # Suzuki expansion of order k
//!
//!   S₁(λ) = [∏_k exp(-i c_k P_k λ/2)] · [∏_k exp(-i c_{n-k} P_{n-k} λ/2)]
//!   S_k(λ) = S_{k-1}(p_k λ)² · S_{k-1}((1 - 4p_k) λ) · S_{k-1}(p_k λ)²
//!   p_k = 1 / (4 - 4^{1/(2k-1)})
//!
//! Each controlled Pauli exponential uses the standard synthesis:
//!
//!   exp(-i θ/2 · Z⊗Z⊗...⊗Z) = CNOT_ladder · CRz(θ) · CNOT_ladder†
//!
//! with basis rotations applied before/after to handle X and Y factors:
//!   X → H · Z · H
//!   Y → Sdg · H · Z · H · S
//!
//! The identity term is a phase on the control qubit.

use hhl_ir::{Circuit, QubitId};

use crate::config::ExpansionMode;
use crate::error::{HhlError, HhlResult};
use crate::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp};

/// Append controlled `exp(-i · coeff · t · P)` to `circuit`.
///
/// `targets[q]` is the circuit qubit carrying Pauli index `q`.
pub fn append_controlled_exp_pauli(
    circuit: &mut Circuit,
    control: QubitId,
    targets: &[QubitId],
    term: &HamiltonianTerm,
    t: f64,
) -> HhlResult<()> {
    let ops = term.pauli.ops();
    if ops.is_empty() {
        circuit.p(-term.coeff * t, control)?;
        return Ok(());
    }

    let qubits = ops
        .iter()
        .map(|&(q, _)| {
            targets.get(q as usize).copied().ok_or_else(|| {
                HhlError::Component(format!(
                    "Pauli string references qubit {q} but only {} targets were given",
                    targets.len()
                ))
            })
        })
        .collect::<HhlResult<Vec<_>>>()?;
    let target = qubits[qubits.len() - 1];

    // θ = 2 · coeff · t  (Rz(θ) implements exp(-i θ/2 Z))
    let theta = 2.0 * term.coeff * t;

    basis_change(circuit, ops, &qubits, false)?;
    cnot_ladder(circuit, &qubits, false)?;
    circuit.crz(theta, control, target)?;
    cnot_ladder(circuit, &qubits, true)?;
    basis_change(circuit, ops, &qubits, true)?;

    Ok(())
}

/// Product formula parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductFormula {
    /// Trotter or Suzuki.
    pub mode: ExpansionMode,
    /// Suzuki order; ignored for Trotter.
    pub order: usize,
    /// Number of repeated slices.
    pub slices: usize,
}

impl ProductFormula {
    /// One slice of total time `lam` as `(term index, time weight)` pairs.
    pub fn slice(&self, n_terms: usize, lam: f64) -> Vec<(usize, f64)> {
        match self.mode {
            ExpansionMode::Trotter => (0..n_terms).map(|k| (k, lam)).collect(),
            ExpansionMode::Suzuki => suzuki_slice(n_terms, lam, self.order.max(1)),
        }
    }
}

/// Append a controlled product-formula approximation of `exp(-i H time)`.
pub fn append_controlled_evolution(
    circuit: &mut Circuit,
    control: QubitId,
    targets: &[QubitId],
    hamiltonian: &Hamiltonian,
    time: f64,
    formula: ProductFormula,
) -> HhlResult<()> {
    if formula.slices == 0 {
        return Err(HhlError::Component(
            "time evolution needs at least one slice".to_string(),
        ));
    }

    let slice = formula.slice(hamiltonian.n_terms(), time / formula.slices as f64);
    for _ in 0..formula.slices {
        for &(k, weight) in &slice {
            append_controlled_exp_pauli(circuit, control, targets, &hamiltonian.terms()[k], weight)?;
        }
    }
    Ok(())
}

/// One Suzuki slice as `(term index, time weight)` pairs.
pub fn suzuki_slice(n_terms: usize, lam: f64, order: usize) -> Vec<(usize, f64)> {
    if order <= 1 {
        let half: Vec<(usize, f64)> = (0..n_terms).map(|k| (k, lam / 2.0)).collect();
        return half.iter().chain(half.iter().rev()).copied().collect();
    }

    let pk = 1.0 / (4.0 - 4f64.powf(1.0 / (2.0 * order as f64 - 1.0)));
    let side_base = suzuki_slice(n_terms, lam * pk, order - 1);
    let middle = suzuki_slice(n_terms, lam * (1.0 - 4.0 * pk), order - 1);

    let mut slice = Vec::with_capacity(4 * side_base.len() + middle.len());
    slice.extend_from_slice(&side_base);
    slice.extend_from_slice(&side_base);
    slice.extend_from_slice(&middle);
    slice.extend_from_slice(&side_base);
    slice.extend_from_slice(&side_base);
    slice
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply basis-change gates for each Pauli operator.
///
/// Forward: X → H, Y → Sdg · H. Reverse: X → H, Y → H · S.
fn basis_change(
    circuit: &mut Circuit,
    ops: &[(u32, PauliOp)],
    qubits: &[QubitId],
    undo: bool,
) -> HhlResult<()> {
    for (&(_, op), &qid) in ops.iter().zip(qubits) {
        match (op, undo) {
            (PauliOp::X, _) => {
                circuit.h(qid)?;
            }
            (PauliOp::Y, false) => {
                circuit.sdg(qid)?;
                circuit.h(qid)?;
            }
            (PauliOp::Y, true) => {
                circuit.h(qid)?;
                circuit.s(qid)?;
            }
            (PauliOp::Z | PauliOp::I, _) => {}
        }
    }
    Ok(())
}

/// CX(q[0],q[1]), CX(q[1],q[2]), …, or the same ladder run backwards.
fn cnot_ladder(circuit: &mut Circuit, qubits: &[QubitId], reverse: bool) -> HhlResult<()> {
    let pairs: Vec<_> = qubits.windows(2).map(|w| (w[0], w[1])).collect();
    if reverse {
        for &(ctrl, tgt) in pairs.iter().rev() {
            circuit.cx(ctrl, tgt)?;
        }
    } else {
        for &(ctrl, tgt) in &pairs {
            circuit.cx(ctrl, tgt)?;
        }
    }
    Ok(())
}
