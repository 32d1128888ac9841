//! In-process simulators for the HHL solver.
//!
//! One dense statevector engine backs two read-out modes, chosen by
//! [`SimulationMethod`]:
//!
//! - `Statevector` returns the final amplitudes and skips measurements.
//! - `Qasm` samples `shots` outcomes from the final distribution and
//!   reports counts grouped by classical register. Measurements must come
//!   last on their qubit.
//!
//! Custom unitaries, such as the state-preparation gate, are applied as
//! dense matrices over their operands. Memory grows as `16 * 2^n` bytes, so
//! the default width cap is
//! [`DEFAULT_SIMULATOR_QUBITS`](hhl_hal::DEFAULT_SIMULATOR_QUBITS).
//!
//! ```ignore
//! use hhl_adapter_sim::SimulatorBackend;
//! use hhl_hal::Backend;
//! use hhl_ir::{Circuit, ClbitId, QubitId};
//!
//! let backend = SimulatorBackend::qasm(1000).with_seed(7);
//! let mut circuit = Circuit::with_size("ghz", 2, 2);
//! circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//! circuit.measure(QubitId(0), ClbitId(0))?.measure(QubitId(1), ClbitId(1))?;
//! let counts = backend.execute(&[circuit]).await?.get_counts(0)?;
//! ```

mod simulator;
mod statevector;

pub use simulator::{SimulationMethod, SimulatorBackend};
pub use statevector::Statevector;
