//! Operations placed on circuit wires.

use serde::{Deserialize, Serialize};

use crate::gate::{Gate, StandardGate};
use crate::register::{ClbitId, QubitId};

/// What an [`Instruction`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Unitary gate.
    Gate(Gate),
    /// Computational-basis measurement, one qubit into one bit.
    Measure,
    /// Scheduling fence; no effect on the state.
    Barrier,
}

/// An operation and the wires it touches.
///
/// Qubit order is significant: for controlled gates the controls come
/// first and the target last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The operation.
    pub kind: InstructionKind,
    /// Qubit operands.
    pub qubits: Vec<QubitId>,
    /// Classical operands; only measurements have any.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// A gate on `qubits`.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: Vec::new(),
        }
    }

    /// A standard gate on one qubit.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// A standard gate on a control/target (or symmetric) pair.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Measure `qubit` into `clbit`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// A barrier across `qubits`.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: Vec::new(),
        }
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// The gate, unless this is a measurement or barrier.
    pub fn as_gate(&self) -> Option<&Gate> {
        if let InstructionKind::Gate(gate) = &self.kind {
            Some(gate)
        } else {
            None
        }
    }

    /// Whether `qubit` is one of the operands.
    pub fn acts_on(&self, qubit: QubitId) -> bool {
        self.qubits.contains(&qubit)
    }

    /// Gate name, or `measure` / `barrier`.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controlled_operand_order() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(3), QubitId(1));
        assert_eq!(inst.qubits, vec![QubitId(3), QubitId(1)]);
        assert!(inst.acts_on(QubitId(1)));
        assert!(!inst.acts_on(QubitId(0)));
        assert_eq!(inst.name(), "cx");
        assert!(inst.as_gate().is_some());
    }

    #[test]
    fn test_measure_wires_one_bit() {
        let inst = Instruction::measure(QubitId(4), ClbitId(0));
        assert!(inst.is_measure());
        assert!(inst.as_gate().is_none());
        assert_eq!(inst.clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_barrier_has_no_bits() {
        let inst = Instruction::barrier([QubitId(0), QubitId(1)]);
        assert_eq!(inst.name(), "barrier");
        assert!(inst.clbits.is_empty());
        assert!(!inst.is_measure());
    }
}
