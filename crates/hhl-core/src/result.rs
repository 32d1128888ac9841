//! The outcome of a solver run.

use std::fmt;

use hhl_ir::CircuitProperties;

use crate::linalg::{Matrix, Vector};

/// Success probability of the reciprocal branch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilityResult {
    /// Weight of the truncated success slice of the statevector.
    Scalar(f64),
    /// Success ratio per tomography variant, truncated to the original
    /// dimension.
    PerBasis(Vec<f64>),
}

impl ProbabilityResult {
    /// The scalar value, if read from a statevector.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ProbabilityResult::Scalar(p) => Some(*p),
            ProbabilityResult::PerBasis(_) => None,
        }
    }

    /// Every reported value.
    pub fn values(&self) -> Vec<f64> {
        match self {
            ProbabilityResult::Scalar(p) => vec![*p],
            ProbabilityResult::PerBasis(ps) => ps.clone(),
        }
    }
}

impl fmt::Display for ProbabilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityResult::Scalar(p) => write!(f, "{p:.6}"),
            ProbabilityResult::PerBasis(ps) => {
                let parts: Vec<String> = ps.iter().map(|p| format!("{p:.4}")).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Immutable result of [`Hhl::run`](crate::Hhl::run).
///
/// Every vector and matrix is truncated to the dimension of the system as
/// supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct HhlSolution {
    output: Vector,
    solution: Vector,
    probability_result: ProbabilityResult,
    matrix: Matrix,
    vector: Vector,
    circuit_info: CircuitProperties,
}

impl HhlSolution {
    pub(crate) fn new(
        output: Vector,
        solution: Vector,
        probability_result: ProbabilityResult,
        matrix: Matrix,
        vector: Vector,
        circuit_info: CircuitProperties,
    ) -> Self {
        Self {
            output,
            solution,
            probability_result,
            matrix,
            vector,
            circuit_info,
        }
    }

    /// Decoded vector before rescaling.
    pub fn output(&self) -> &Vector {
        &self.output
    }

    /// Rescaled approximation of `A⁻¹b`.
    pub fn solution(&self) -> &Vector {
        &self.solution
    }

    /// Success probability.
    pub fn probability_result(&self) -> &ProbabilityResult {
        &self.probability_result
    }

    /// System matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Right-hand side.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Statistics of the main circuit.
    pub fn circuit_info(&self) -> &CircuitProperties {
        &self.circuit_info
    }
}
