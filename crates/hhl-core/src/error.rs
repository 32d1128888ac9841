//! Error types for the solver.

use hhl_hal::HalError;
use hhl_ir::IrError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced while configuring or running the solver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HhlError {
    /// Vector length and matrix row count differ.
    #[error("Vector has {vector_len} entries but matrix has {matrix_rows} rows")]
    DimensionMismatch {
        /// Length of the right-hand side.
        vector_len: usize,
        /// Rows of the matrix.
        matrix_rows: usize,
    },

    /// Matrix is not square.
    #[error("Matrix is not square: {rows}x{cols}")]
    NonSquareMatrix {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Matrix is not Hermitian within tolerance.
    #[error("Matrix is not Hermitian (enable auto_hermitian to embed it)")]
    NotHermitian,

    /// Matrix dimension is not a power of two.
    #[error("Matrix dimension {0} is not a power of two (enable auto_resize to pad it)")]
    InvalidDimension(usize),

    /// No linear system was supplied.
    #[error("No linear system supplied")]
    MissingInput,

    /// Input file could not be turned into a matrix and vector.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Circuit construction failed.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] IrError),

    /// The execution backend failed.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No factory is registered under the requested name.
    #[error("Unknown {kind} '{name}'")]
    UnknownComponent {
        /// Component kind, e.g. `"eigenvalue estimator"`.
        kind: &'static str,
        /// Requested name.
        name: String,
    },

    /// An engine rejected its inputs.
    #[error("Component error: {0}")]
    Component(String),

    /// The backend returned a different number of experiments than submitted.
    #[error("Expected {expected} experiments, backend returned {got}")]
    ResultMismatch {
        /// Submitted circuits.
        expected: usize,
        /// Returned experiments.
        got: usize,
    },

    /// An experiment lacks the data the chosen strategy reads.
    #[error("Experiment '{experiment}' has no {kind}")]
    MissingData {
        /// Experiment name.
        experiment: String,
        /// Missing data kind, e.g. `"counts"`.
        kind: &'static str,
    },

    /// A count key does not have the register-grouped layout.
    #[error("Malformed count key: {0}")]
    MalformedCounts(String),

    /// A count table holds no shots.
    #[error("Experiment '{0}' recorded no shots")]
    EmptyCounts(String),
}

/// Result type for solver operations.
pub type HhlResult<T> = Result<T, HhlError>;
