//! Dense statevector kernels.
//!
//! Amplitude index bit `k` is qubit position `k`.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::PI;

use hhl_ir::{CustomGate, GateKind, StandardGate};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A 2x2 row-major single-qubit unitary.
type Mat2 = [Complex64; 4];

/// `2^n` amplitudes of an `n`-qubit register.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// `|0...0>` on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state, returning its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Outcome probabilities `|a_i|^2`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Apply a gate whose operand `k` sits at amplitude bit `qubits[k]`.
    pub fn apply_gate(&mut self, gate: &GateKind, qubits: &[usize]) {
        match gate {
            GateKind::Standard(g) => self.apply_standard(g, qubits),
            GateKind::Custom(g) => self.apply_dense(g, qubits),
        }
    }

    #[allow(clippy::enum_glob_use)]
    fn apply_standard(&mut self, gate: &StandardGate, q: &[usize]) {
        use StandardGate::*;
        let ctrl = |n: usize| q[..n].iter().fold(0usize, |m, c| m | (1 << c));
        match gate {
            I => {}
            Z => self.phase(ctrl(1), PI),
            S => self.phase(ctrl(1), PI / 2.0),
            Sdg => self.phase(ctrl(1), -PI / 2.0),
            T => self.phase(ctrl(1), PI / 4.0),
            Tdg => self.phase(ctrl(1), -PI / 4.0),
            P(l) => self.phase(ctrl(1), *l),
            CZ => self.phase(ctrl(2), PI),
            CP(l) => self.phase(ctrl(2), *l),
            Swap => self.exchange(0, q[0], q[1]),
            CSwap => self.exchange(ctrl(1), q[1], q[2]),
            _ => {
                let n = q.len() - 1;
                if let Some(m) = pauli_rotation(gate) {
                    self.controlled(ctrl(n), q[n], &m);
                }
            }
        }
    }

    /// Multiply `e^{i theta}` into every amplitude whose index covers `mask`.
    fn phase(&mut self, mask: usize, theta: f64) {
        let factor = Complex64::from_polar(1.0, theta);
        self.amplitudes
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| i & mask == mask)
            .for_each(|(_, a)| *a *= factor);
    }

    /// Exchange bits `a` and `b` of every index that covers `controls`.
    fn exchange(&mut self, controls: usize, a: usize, b: usize) {
        let (ma, mb) = (1 << a, 1 << b);
        for i in 0..self.amplitudes.len() {
            if i & controls == controls && i & ma != 0 && i & mb == 0 {
                self.amplitudes.swap(i, i ^ ma ^ mb);
            }
        }
    }

    /// Apply `m` to `target` where all of `controls` are set.
    fn controlled(&mut self, controls: usize, target: usize, m: &Mat2) {
        let bit = 1 << target;
        for lo in 0..self.amplitudes.len() {
            if lo & bit != 0 || lo & controls != controls {
                continue;
            }
            let hi = lo | bit;
            let (a, b) = (self.amplitudes[lo], self.amplitudes[hi]);
            self.amplitudes[lo] = m[0] * a + m[1] * b;
            self.amplitudes[hi] = m[2] * a + m[3] * b;
        }
    }

    /// Dense matrix-vector product over the gate's operand subspace.
    fn apply_dense(&mut self, gate: &CustomGate, qubits: &[usize]) {
        let dim = gate.dim();
        let matrix = gate.matrix();
        // Global index offset of each local basis state.
        let offsets: Vec<usize> = (0..dim)
            .map(|local| {
                qubits
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| local >> k & 1 == 1)
                    .fold(0, |acc, (_, q)| acc | 1 << q)
            })
            .collect();
        let operands = offsets[dim - 1];

        let mut column = vec![ZERO; dim];
        for base in (0..self.amplitudes.len()).filter(|i| i & operands == 0) {
            for (c, off) in column.iter_mut().zip(&offsets) {
                *c = self.amplitudes[base | off];
            }
            for (row, off) in matrix.chunks_exact(dim).zip(&offsets) {
                self.amplitudes[base | off] = row.iter().zip(&column).map(|(m, c)| m * c).sum();
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Draw `shots` outcomes from the final distribution.
    ///
    /// Returns a histogram over amplitude indices; indices never drawn are
    /// absent.
    pub fn sample_histogram<R: Rng + ?Sized>(&self, shots: u32, rng: &mut R) -> Vec<(usize, u64)> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut total = 0.0;
        for amp in &self.amplitudes {
            total += amp.norm_sqr();
            cumulative.push(total);
        }

        let last = self.amplitudes.len() - 1;
        let mut hits = vec![0u64; self.amplitudes.len()];
        for _ in 0..shots {
            let r: f64 = rng.r#gen::<f64>() * total;
            let outcome = cumulative.partition_point(|&c| c <= r).min(last);
            hits[outcome] += 1;
        }

        hits.into_iter()
            .enumerate()
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// 2x2 block of the gates that act as a single (possibly controlled)
/// one-qubit unitary on their last operand.
#[allow(clippy::enum_glob_use)]
fn pauli_rotation(gate: &StandardGate) -> Option<Mat2> {
    use StandardGate::*;
    let i = Complex64::i();
    let r = |x: f64| Complex64::new(x, 0.0);
    let half_turn = |t: f64| ((t / 2.0).cos(), (t / 2.0).sin());
    let m = match gate {
        X | CX | CCX => [ZERO, ONE, ONE, ZERO],
        Y | CY => [ZERO, -i, i, ZERO],
        H | CH => {
            let h = r(std::f64::consts::FRAC_1_SQRT_2);
            [h, h, h, -h]
        }
        SX | SXdg | Rx(_) | CRx(_) => {
            let t = match gate {
                SX => PI / 2.0,
                SXdg => -PI / 2.0,
                Rx(t) | CRx(t) => *t,
                _ => return None,
            };
            let (c, s) = half_turn(t);
            [r(c), -i * s, -i * s, r(c)]
        }
        Ry(t) | CRy(t) => {
            let (c, s) = half_turn(*t);
            [r(c), r(-s), r(s), r(c)]
        }
        Rz(t) | CRz(t) => [
            Complex64::from_polar(1.0, -t / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, t / 2.0),
        ],
        U(theta, phi, lambda) => {
            let (c, s) = half_turn(*theta);
            [
                r(c),
                -Complex64::from_polar(s, *lambda),
                Complex64::from_polar(s, *phi),
                Complex64::from_polar(c, phi + lambda),
            ]
        }
        _ => return None,
    };
    Some(m)
}
