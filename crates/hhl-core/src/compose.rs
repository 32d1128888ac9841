//! Assembly of the HHL circuit.
//!
//! ```text
//!   io ──[state prep]──[QPE]────────────────[QPE†]──
//!   eigs ──────────────[QPE]──●──────────────[QPE†]──
//!   anc ─────────────────────[RY(θ_k)]──────────(M)──
//! ```
//!
//! The inverse estimation is built from the forward sub-circuit object
//! itself, so un-computation always mirrors the exact gate sequence that was
//! applied.

use hhl_ir::{Circuit, ClbitId, QuantumRegister, QubitId};
use tracing::debug;

use crate::error::{HhlError, HhlResult};
use crate::problem::ValidatedProblem;
use crate::registry::Components;

/// Name of the main circuit.
pub const CIRCUIT_NAME: &str = "hhl";
/// Name of the io register.
pub const IO_REGISTER: &str = "io";
/// Classical register receiving the success bit.
pub const SUCCESS_REGISTER: &str = "c";

/// A built circuit and the wiring the extractor needs.
#[derive(Debug, Clone)]
pub struct HhlCircuit {
    /// The full circuit.
    pub circuit: Circuit,
    /// Register carrying `b`, then `x`.
    pub io: QuantumRegister,
    /// Phase-estimation register.
    pub eigenvalue: QuantumRegister,
    /// Reciprocal success ancilla.
    pub ancilla: QubitId,
    /// Classical bit the ancilla was measured into, if requested.
    pub success_bit: Option<ClbitId>,
}

/// Sequences state preparation, estimation, rotation and un-computation.
#[derive(Debug, Clone, Copy)]
pub struct CircuitComposer<'a> {
    problem: &'a ValidatedProblem,
    components: &'a Components,
}

impl<'a> CircuitComposer<'a> {
    /// Compose circuits for `problem` with the resolved engines.
    pub fn new(problem: &'a ValidatedProblem, components: &'a Components) -> Self {
        Self {
            problem,
            components,
        }
    }

    /// Build the circuit, measuring the ancilla into `c` when `measurement`.
    ///
    /// Deterministic: repeated calls yield gate-identical circuits.
    pub fn construct(&self, measurement: bool) -> HhlResult<HhlCircuit> {
        let Components {
            eigs,
            init_state,
            reciprocal,
            ..
        } = self.components;

        let (num_q, _) = eigs.register_sizes();
        if num_q != self.problem.num_qubits() {
            return Err(HhlError::Component(format!(
                "estimator expects {num_q} io qubits, problem has {}",
                self.problem.num_qubits()
            )));
        }

        let mut circuit = Circuit::new(CIRCUIT_NAME);
        let io = circuit.add_qreg(IO_REGISTER, num_q as u32);

        let prep = init_state.build(&circuit, &io, self.problem.vector())?;
        circuit.compose(&prep)?;

        let (forward, eigenvalue) = eigs.build_forward(&circuit, &io)?;
        circuit.compose(&forward)?;

        let (rotation, ancilla) = reciprocal.build(&circuit, &eigenvalue)?;
        circuit.compose(&rotation)?;

        let inverse = eigs.build_inverse(&forward, &io, &eigenvalue)?;
        circuit.compose(&inverse)?;

        let success_bit = if measurement {
            let creg = circuit.add_creg(SUCCESS_REGISTER, 1);
            let bit = creg.clbits()[0];
            circuit.measure(ancilla, bit)?;
            Some(bit)
        } else {
            None
        };

        debug!(
            qubits = circuit.num_qubits(),
            size = circuit.size(),
            measurement,
            "constructed HHL circuit"
        );

        Ok(HhlCircuit {
            circuit,
            io,
            eigenvalue,
            ancilla,
            success_bit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HhlConfig;
    use crate::registry::ComponentRegistry;
    use crate::testing::real_problem;
    use std::f64::consts::PI;

    fn components(problem: &ValidatedProblem) -> Components {
        let mut config = HhlConfig::default();
        config.eigs.num_ancillae = 3;
        config.eigs.num_time_slices = 2;
        config.eigs.evo_time = Some(PI / 2.0);
        ComponentRegistry::with_builtins()
            .resolve(&config, problem)
            .unwrap()
    }

    #[test]
    fn test_register_layout() {
        let problem = real_problem(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![1.0, 0.0]);
        let components = components(&problem);
        let built = CircuitComposer::new(&problem, &components)
            .construct(false)
            .unwrap();

        assert_eq!(built.circuit.name(), CIRCUIT_NAME);
        assert_eq!(built.io.qubits(), &[QubitId(0)]);
        assert_eq!(built.eigenvalue.len(), 3);
        assert_eq!(built.ancilla, QubitId(4));
        assert_eq!(built.circuit.num_qubits(), 5);
        assert_eq!(built.circuit.num_clbits(), 0);
        assert!(built.success_bit.is_none());
        assert_eq!(built.circuit.instructions()[0].name(), "state_prep");
    }

    #[test]
    fn test_measurement_attaches_success_bit() {
        let problem = real_problem(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![1.0, 0.0]);
        let components = components(&problem);
        let built = CircuitComposer::new(&problem, &components)
            .construct(true)
            .unwrap();

        let bit = built.success_bit.unwrap();
        let last = built.circuit.instructions().pop().unwrap();
        assert!(last.is_measure());
        assert_eq!(last.qubits, vec![built.ancilla]);
        assert_eq!(last.clbits, vec![bit]);
        assert!(built.circuit.creg(SUCCESS_REGISTER).is_some());
    }

    #[test]
    fn test_inverse_mirrors_forward() {
        let problem = real_problem(vec![vec![1.0, 0.5], vec![0.5, 1.0]], vec![1.0, 0.0]);
        let components = components(&problem);
        let ops = CircuitComposer::new(&problem, &components)
            .construct(false)
            .unwrap()
            .circuit
            .instructions();

        // state prep, then forward, rotation and the mirrored forward
        let rotation_start = ops.iter().position(|i| i.name() == "ry").unwrap();
        let rotation_end = ops.iter().rposition(|i| i.name() == "ry").unwrap() + 2;
        let forward = &ops[1..rotation_start];
        let inverse = &ops[rotation_end..];
        assert_eq!(forward.len(), inverse.len());
        for (f, i) in forward.iter().zip(inverse.iter().rev()) {
            assert_eq!(f.qubits, i.qubits);
            assert_eq!(hhl_ir::inverse_instruction(f).unwrap(), *i);
        }
    }
}
