//! Backend and result-lookup errors.

use thiserror::Error;

/// Failure reported by a backend or while reading its results.
///
/// The solver passes these through to its caller unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No backend by that name, or the backend is offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The circuit uses an operation or wiring the backend cannot run.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// A backend option could not be interpreted.
    #[error("Backend configuration error: {0}")]
    Configuration(String),

    /// The circuit is wider than the backend.
    #[error("Circuit too large: {0}")]
    CircuitTooLarge(String),

    /// The backend cannot honour a request, such as gates after measurement.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Shot count outside the backend's range.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// An experiment, or the counts or amplitudes of one, is absent.
    #[error("Result lookup failed: {0}")]
    MissingResult(String),
}

/// Result alias for backend operations.
pub type HalResult<T> = Result<T, HalError>;
