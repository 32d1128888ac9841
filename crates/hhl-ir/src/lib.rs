//! Circuit Intermediate Representation for the HHL solver
//!
//! This crate provides the data structures the solver builds its circuits
//! from: qubits and named registers, standard and custom-unitary gates,
//! instructions, and a DAG that records them.
//!
//! # Overview
//!
//! The circuit IR uses a DAG (Directed Acyclic Graph) representation internally.
//! The high-level [`Circuit`] API provides a builder pattern for constructing
//! circuits, plus the two operations the solver leans on most:
//! [`Circuit::compose`] to stitch sub-circuits together over shared
//! registers and [`Circuit::inverse`] to un-compute them.
//!
//! # Bit order
//!
//! Qubit ids are allocated densely from zero and double as statevector bit
//! positions. Within a register, index 0 is the least significant bit.
//!
//! # Example: Composing a Sub-circuit
//!
//! ```rust
//! use hhl_ir::Circuit;
//!
//! let mut main = Circuit::new("main");
//! let io = main.add_qreg("io", 1);
//!
//! // Build a fragment against the same wiring, adding a fresh register.
//! let mut fragment = main.empty_like("rotation");
//! let anc = fragment.add_qreg("anc", 1);
//! fragment.h(io.qubits()[0]).unwrap();
//! fragment.cry(0.5, io.qubits()[0], anc.qubits()[0]).unwrap();
//!
//! main.compose(&fragment).unwrap();
//! let undo = fragment.inverse().unwrap();
//! main.compose(&undo).unwrap();
//!
//! assert_eq!(main.num_qubits(), 2);
//! assert_eq!(main.size(), 4);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled Paulis and Hadamard |
//! | `CRx`, `CRy`, `CRz`, `CP` | 2 | Controlled rotations |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX`, `CSwap` | 3 | Toffoli and Fredkin gates |
//! | custom | n | Explicit `2^n × 2^n` unitary |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod inverse;
pub mod properties;
pub mod register;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use inverse::{inverse_circuit, inverse_gate, inverse_instruction, is_self_inverse};
pub use properties::CircuitProperties;
pub use register::{
    Bit, BitId, Clbit, ClbitId, ClassicalRegister, QuantumRegister, Qubit, QubitId, Register,
};
