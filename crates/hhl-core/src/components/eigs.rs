//! Quantum phase estimation of a Hermitian matrix.
//!
//! The forward circuit puts the eigenvalue register in uniform
//! superposition, applies `exp(iAt·2^j)` controlled on eigen qubit `j`, and
//! finishes with an inverse QFT. An eigenvector of eigenvalue `λ` then leaves
//! the register holding `k = λ·t·2^n / 2π` (two's complement when negative
//! eigenvalues are enabled).

use std::f64::consts::PI;

use hhl_ir::{Circuit, QuantumRegister};
use tracing::debug;

use super::{EigenvalueEstimator, ensure_fresh_register};
use crate::config::EigsConfig;
use crate::error::{HhlError, HhlResult};
use crate::evolution::{ProductFormula, append_controlled_evolution};
use crate::hamiltonian::Hamiltonian;
use crate::problem::ValidatedProblem;
use crate::qft::inverse_qft;

/// Register name of the eigenvalue register.
pub const EIGS_REGISTER: &str = "eigs";

/// Phase estimation driven by a Pauli decomposition of the matrix.
#[derive(Debug, Clone)]
pub struct QpeEigenvalues {
    /// `-A`, so that evolving under it for time `t` applies `exp(iAt)`.
    generator: Hamiltonian,
    num_q: usize,
    num_a: usize,
    formula: ProductFormula,
    negative_evals: bool,
    evo_time: f64,
}

impl QpeEigenvalues {
    /// Configure the estimator for `problem`.
    ///
    /// When `config.evo_time` is absent it is chosen so the largest
    /// eigenvalue bound `Σ|c_P|` maps just below the top of the register
    /// (or of its positive half with `negative_evals`).
    pub fn new(problem: &ValidatedProblem, config: &EigsConfig) -> HhlResult<Self> {
        if config.num_ancillae == 0 {
            return Err(HhlError::Component(
                "phase estimation needs at least one eigenvalue qubit".to_string(),
            ));
        }

        let hamiltonian = Hamiltonian::from_matrix(problem.matrix());
        let evo_time = match config.evo_time {
            Some(t) => t,
            None => default_evo_time(hamiltonian.lambda(), config.num_ancillae, config.negative_evals)?,
        };
        if !evo_time.is_finite() || evo_time <= 0.0 {
            return Err(HhlError::Component(format!(
                "evolution time must be positive, got {evo_time}"
            )));
        }

        debug!(
            terms = hamiltonian.n_terms(),
            lambda = hamiltonian.lambda(),
            evo_time,
            "configured phase estimation"
        );

        Ok(Self {
            generator: hamiltonian.scaled(-1.0),
            num_q: problem.num_qubits(),
            num_a: config.num_ancillae,
            formula: ProductFormula {
                mode: config.expansion_mode,
                order: config.expansion_order,
                slices: config.num_time_slices,
            },
            negative_evals: config.negative_evals,
            evo_time,
        })
    }
}

fn default_evo_time(lambda_max: f64, num_a: usize, negative_evals: bool) -> HhlResult<f64> {
    if lambda_max <= 0.0 {
        return Err(HhlError::Component(
            "cannot derive an evolution time for the zero matrix".to_string(),
        ));
    }
    let top = if negative_evals { 0.5 } else { 1.0 };
    let exponent = i32::try_from(num_a).unwrap_or(i32::MAX);
    Ok((top - 2f64.powi(-exponent)) * 2.0 * PI / lambda_max)
}

impl EigenvalueEstimator for QpeEigenvalues {
    fn name(&self) -> &str {
        "qpe"
    }

    fn register_sizes(&self) -> (usize, usize) {
        (self.num_q, self.num_a)
    }

    fn negative_evals(&self) -> bool {
        self.negative_evals
    }

    fn evo_time(&self) -> f64 {
        self.evo_time
    }

    fn build_forward(
        &self,
        base: &Circuit,
        io: &QuantumRegister,
    ) -> HhlResult<(Circuit, QuantumRegister)> {
        if io.len() != self.num_q {
            return Err(HhlError::Component(format!(
                "phase estimation expects {} io qubits, register '{}' has {}",
                self.num_q,
                io.name(),
                io.len()
            )));
        }
        ensure_fresh_register(base, EIGS_REGISTER)?;

        let mut circuit = base.empty_like("qpe");
        let eigs = circuit.add_qreg(EIGS_REGISTER, self.num_a as u32);

        for &q in eigs.qubits() {
            circuit.h(q)?;
        }
        let mut time = self.evo_time;
        for &control in eigs.qubits() {
            append_controlled_evolution(
                &mut circuit,
                control,
                io.qubits(),
                &self.generator,
                time,
                self.formula,
            )?;
            time *= 2.0;
        }
        let iqft = inverse_qft(&circuit, &eigs)?;
        circuit.compose(&iqft)?;

        Ok((circuit, eigs))
    }

    fn build_inverse(
        &self,
        forward: &Circuit,
        input: &QuantumRegister,
        output: &QuantumRegister,
    ) -> HhlResult<Circuit> {
        for register in [input, output] {
            if !forward.contains_qreg(register) {
                return Err(HhlError::Component(format!(
                    "forward circuit '{}' does not hold register '{}'",
                    forward.name(),
                    register.name()
                )));
            }
        }
        let mut inverse = forward.inverse()?;
        inverse.set_name("qpe_dg");
        Ok(inverse)
    }
}
