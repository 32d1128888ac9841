//! Quantum Fourier transform over a little-endian register.
//!
//! `QFT|x⟩ = 2^{-n/2} Σ_k e^{2πi·xk/2^n} |k⟩`, with register qubit `j`
//! carrying bit `j` of both `x` and `k`.

use std::f64::consts::PI;

use hhl_ir::{Circuit, QuantumRegister};

use crate::error::HhlResult;

/// QFT on `register`, built on an empty copy of `base`.
pub fn qft(base: &Circuit, register: &QuantumRegister) -> HhlResult<Circuit> {
    let mut circuit = base.empty_like("qft");
    let q = register.qubits();
    let n = q.len();

    for j in (0..n).rev() {
        circuit.h(q[j])?;
        for m in (0..j).rev() {
            circuit.cp(PI / f64::from(1u32 << (j - m)), q[m], q[j])?;
        }
    }
    for i in 0..n / 2 {
        circuit.swap(q[i], q[n - 1 - i])?;
    }
    Ok(circuit)
}

/// Inverse QFT on `register`, named `iqft`.
pub fn inverse_qft(base: &Circuit, register: &QuantumRegister) -> HhlResult<Circuit> {
    let mut circuit = qft(base, register)?.inverse()?;
    circuit.set_name("iqft");
    Ok(circuit)
}
