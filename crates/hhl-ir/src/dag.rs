//! Wire graph behind [`Circuit`](crate::Circuit).
//!
//! Each qubit and classical bit is a wire running from an `In` node to an
//! `Out` node. Appending an instruction splices a new `Op` node into every
//! wire it touches, just before that wire's `Out` node. Edges are labelled
//! with the wire they belong to.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::register::{ClbitId, QubitId};

pub type NodeIndex = PetNodeIndex<u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    In(WireId),
    Out(WireId),
    Op(Instruction),
}

impl DagNode {
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            DagNode::In(_) | DagNode::Out(_) => None,
        }
    }
}

/// A quantum or classical wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireId {
    Qubit(QubitId),
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// Endpoints of one wire plus the node currently feeding its `Out`.
#[derive(Debug, Clone, Copy)]
struct WireEnds {
    input: NodeIndex,
    output: NodeIndex,
    last: NodeIndex,
}

/// Append-only circuit graph.
///
/// Instructions are never reordered or removed, so `ops` (insertion order)
/// is already a topological order and is what [`CircuitDag::topological_ops`]
/// walks. Rebuilding from the same inputs yields the same sequence.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, WireId, u32>,
    wires: BTreeMap<WireId, WireEnds>,
    ops: Vec<NodeIndex>,
}

impl CircuitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit wire. Re-adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        self.add_wire(WireId::Qubit(qubit));
    }

    /// Add a classical wire. Re-adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        self.add_wire(WireId::Clbit(clbit));
    }

    fn add_wire(&mut self, wire: WireId) {
        if self.wires.contains_key(&wire) {
            return;
        }
        let input = self.graph.add_node(DagNode::In(wire));
        let output = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(input, output, wire);
        self.wires.insert(
            wire,
            WireEnds {
                input,
                output,
                last: input,
            },
        );
    }

    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let op = || instruction.name().to_string();

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            if instruction.qubits.len() != expected {
                return Err(IrError::QubitCountMismatch {
                    op: op(),
                    expected,
                    got: instruction.qubits.len(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.wires.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound { qubit, op: op() });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, op: op() });
            }
        }
        if let Some(&clbit) = instruction
            .clbits
            .iter()
            .find(|c| !self.wires.contains_key(&WireId::Clbit(**c)))
        {
            return Err(IrError::ClbitNotFound { clbit, op: op() });
        }
        Ok(())
    }

    /// Append an instruction after everything already on its wires.
    ///
    /// Operands are checked first; on error the graph is unchanged.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.check_operands(&instruction)?;

        let touched: Vec<WireId> = instruction
            .qubits
            .iter()
            .copied()
            .map(WireId::from)
            .chain(instruction.clbits.iter().copied().map(WireId::from))
            .collect();

        let node = self.graph.add_node(DagNode::Op(instruction));
        for wire in touched {
            let ends = self
                .wires
                .get_mut(&wire)
                .ok_or_else(|| IrError::InvalidDag(format!("{wire:?} vanished")))?;
            let tail = self.graph.find_edge(ends.last, ends.output).ok_or_else(|| {
                IrError::InvalidDag(format!("{wire:?} has no edge into its output"))
            })?;
            self.graph.remove_edge(tail);
            self.graph.add_edge(ends.last, node, wire);
            self.graph.add_edge(node, ends.output, wire);
            ends.last = node;
        }

        self.ops.push(node);
        Ok(node)
    }

    /// Operations in insertion order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.ops
            .iter()
            .filter_map(|&idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits().len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits().len()
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Longest chain of operations, barriers included.
    pub fn depth(&self) -> usize {
        let mut layer: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        for &node in &self.ops {
            let below = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| layer.get(&pred).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            layer.insert(node, below + 1);
        }
        layer.values().copied().max().unwrap_or(0)
    }

    /// Weakly connected components; an idle wire is a factor of its own.
    pub fn num_tensor_factors(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Operation counts keyed by instruction name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, inst) in self.topological_ops() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Qubits in id order.
    pub fn qubits(&self) -> Vec<QubitId> {
        self.wires
            .keys()
            .filter_map(|w| match w {
                WireId::Qubit(q) => Some(*q),
                WireId::Clbit(_) => None,
            })
            .collect()
    }

    /// Classical bits in id order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        self.wires
            .keys()
            .filter_map(|w| match w {
                WireId::Clbit(c) => Some(*c),
                WireId::Qubit(_) => None,
            })
            .collect()
    }

    /// Walk every wire from `In` to `Out` and cross-check the op list.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::toposort(&self.graph, None).is_err() {
            return Err(IrError::InvalidDag("cycle detected".into()));
        }

        for (&wire, ends) in &self.wires {
            let mut node = ends.input;
            let mut hops = 0;
            while node != ends.output {
                node = self
                    .graph
                    .edges_directed(node, Direction::Outgoing)
                    .find(|e| *e.weight() == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!("{wire:?} breaks off at {node:?}"))
                    })?;
                hops += 1;
                if hops > self.graph.node_count() {
                    return Err(IrError::InvalidDag(format!("{wire:?} never reaches its output")));
                }
            }
            if self.graph.find_edge(ends.last, ends.output).is_none() {
                return Err(IrError::InvalidDag(format!("{wire:?} has a stale tail")));
            }
        }

        let op_nodes = self
            .graph
            .node_weights()
            .filter(|n| matches!(n, DagNode::Op(_)))
            .count();
        if op_nodes != self.ops.len() {
            return Err(IrError::InvalidDag(format!(
                "{} ops recorded, {op_nodes} in the graph",
                self.ops.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn two_qubits() -> CircuitDag {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
        assert_eq!(dag.num_tensor_factors(), 0);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_wires_are_added_once() {
        let mut dag = two_qubits();
        dag.add_qubit(QubitId(1));
        dag.add_clbit(ClbitId(0));
        assert_eq!(dag.qubits(), vec![QubitId(0), QubitId(1)]);
        assert_eq!(dag.clbits(), vec![ClbitId(0)]);
        assert_eq!(dag.num_tensor_factors(), 3);
    }

    #[test]
    fn test_entangler_joins_factors() {
        let mut dag = two_qubits();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        assert_eq!(dag.num_tensor_factors(), 2);
        dag.apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
            .unwrap();
        assert_eq!(dag.num_tensor_factors(), 1);
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_parallel_layer() {
        let mut dag = two_qubits();
        for q in [0, 1] {
            dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(q)))
                .unwrap();
        }
        assert_eq!(dag.depth(), 1);
        assert_eq!(dag.count_ops().get("x"), Some(&2));
    }

    #[test]
    fn test_barrier_adds_a_layer() {
        let mut dag = two_qubits();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::barrier([QubitId(0), QubitId(1)]))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        assert_eq!(dag.depth(), 3);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut dag = two_qubits();
        for (gate, q) in [(StandardGate::Z, 1), (StandardGate::H, 0), (StandardGate::X, 1)] {
            dag.apply(Instruction::single_qubit_gate(gate, QubitId(q)))
                .unwrap();
        }
        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["z", "h", "x"]);
    }

    #[test]
    fn test_operand_errors_leave_graph_untouched() {
        let mut dag = two_qubits();

        let err = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch { expected: 2, got: 1, ref op } if op == "cx"
        ));

        let err = dag
            .apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(7)))
            .unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(7), .. }));

        let err = dag
            .apply(Instruction::two_qubit_gate(StandardGate::CZ, QubitId(1), QubitId(1)))
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { qubit: QubitId(1), .. }));

        let err = dag
            .apply(Instruction::measure(QubitId(0), ClbitId(3)))
            .unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { ref op, .. } if op == "measure"));

        assert_eq!(dag.num_ops(), 0);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_measurement_wires_verify() {
        let mut dag = two_qubits();
        dag.add_clbit(ClbitId(0));
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
            .unwrap();
        let node = dag.apply(Instruction::measure(QubitId(1), ClbitId(0))).unwrap();

        dag.verify_integrity().unwrap();
        assert_eq!(dag.depth(), 3);
        assert!(dag.get_instruction(node).is_some_and(Instruction::is_measure));
    }
}
