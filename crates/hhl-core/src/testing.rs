//! Shared helpers for unit tests.

use hhl_adapter_sim::Statevector;
use hhl_ir::{Circuit, QuantumRegister};
use num_complex::Complex64;

use crate::problem::{LinearSystemInput, ValidatedProblem};

/// A validated real problem with both expansions disabled.
pub(crate) fn real_problem(matrix: Vec<Vec<f64>>, vector: Vec<f64>) -> ValidatedProblem {
    let input = LinearSystemInput::real(matrix, vector);
    ValidatedProblem::from_input(Some(&input), false, false).unwrap()
}

/// Final amplitudes of `circuit`, ignoring measurements and barriers.
pub(crate) fn simulate(circuit: &Circuit) -> Vec<Complex64> {
    let mut sv = Statevector::new(circuit.num_qubits());
    for inst in circuit.instructions() {
        if let Some(gate) = inst.as_gate() {
            let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.0 as usize).collect();
            sv.apply_gate(&gate.kind, &qubits);
        }
    }
    sv.into_amplitudes()
}

/// Basis index with each register holding the given little-endian value.
pub(crate) fn basis_index(values: &[(&QuantumRegister, usize)]) -> usize {
    let mut index = 0;
    for (register, value) in values {
        for (bit, qubit) in register.qubits().iter().enumerate() {
            if (value >> bit) & 1 == 1 {
                index |= 1 << qubit.0;
            }
        }
    }
    index
}
