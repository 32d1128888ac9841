//! Circuit construction errors.

use thiserror::Error;

use crate::register::{ClbitId, QubitId};

/// Why a circuit edit or gate construction was refused.
///
/// `op` fields hold the instruction name (`cx`, `measure`, a custom gate's
/// label) so messages point at the offending operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    #[error("'{op}' refers to qubit {qubit:?}, which is not on the circuit")]
    QubitNotFound { qubit: QubitId, op: String },

    #[error("'{op}' refers to classical bit {clbit:?}, which is not on the circuit")]
    ClbitNotFound { clbit: ClbitId, op: String },

    #[error("'{op}' uses qubit {qubit:?} more than once")]
    DuplicateQubit { qubit: QubitId, op: String },

    #[error("'{op}' acts on {expected} qubits but was given {got}")]
    QubitCountMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    /// Unitary matrix whose entry count is not `(2^n)^2`.
    #[error("Unitary for '{op}' has {got} entries where {expected} are needed")]
    MatrixDimension {
        op: String,
        expected: usize,
        got: usize,
    },

    /// Wire bookkeeping disagrees with the graph.
    #[error("Malformed circuit graph: {0}")]
    InvalidDag(String),

    /// A register name is reused with a different layout.
    #[error("Register conflict: {0}")]
    RegisterConflict(String),

    #[error("'{0}' has no inverse")]
    NonInvertible(String),
}

pub type IrResult<T> = Result<T, IrError>;
