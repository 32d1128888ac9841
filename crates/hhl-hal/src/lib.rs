//! Backend seam of the HHL solver.
//!
//! The solver never runs circuits itself. It submits its whole batch to a
//! [`Backend`] and reads the returned [`ExecutionResult`] one of two ways:
//!
//! - amplitudes, via [`ExecutionResult::get_statevector`], when
//!   [`Backend::is_statevector`] holds;
//! - register-grouped [`Counts`], via [`ExecutionResult::get_counts`],
//!   otherwise.
//!
//! [`Capabilities`] carry that choice along with width and gate limits, and
//! [`BackendRegistry`] builds backends from configured names.
//!
//! A backend only has to say who it is and run a batch:
//!
//! ```ignore
//! #[async_trait]
//! impl Backend for Recorder {
//!     fn name(&self) -> &str { "recorder" }
//!     fn capabilities(&self) -> &Capabilities { &self.caps }
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::unavailable("read-only"))
//!     }
//!     async fn execute(&self, circuits: &[Circuit]) -> HalResult<ExecutionResult> {
//!         // exactly one experiment per circuit, in order
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod registry;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult,
    validate_against,
};
pub use capability::{
    Capabilities, DEFAULT_SIMULATOR_QUBITS, FEATURE_COUNTS, FEATURE_STATEVECTOR, FEATURE_UNITARY,
    GateSet,
};
pub use error::{HalError, HalResult};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult, ExperimentData, ExperimentHeader, ExperimentResult};
