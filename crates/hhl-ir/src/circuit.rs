//! Circuit builder.

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::inverse::inverse_circuit;
use crate::properties::CircuitProperties;
use crate::register::{
    Bit, BitId, Clbit, ClbitId, ClassicalRegister, QuantumRegister, Qubit, QubitId, Register,
};

/// An append-only quantum circuit over named registers.
///
/// Bit ids come from per-circuit counters. A sub-circuit started with
/// [`empty_like`](Circuit::empty_like) continues those counters, so any
/// registers it adds get ids its parent has not used and
/// [`compose`](Circuit::compose) merges it back without remapping.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<QuantumRegister>,
    cregs: Vec<ClassicalRegister>,
    dag: CircuitDag,
}

/// Hand out `size` fresh ids after the largest one in `bits`.
fn allocate<I: BitId>(bits: &mut Vec<Bit<I>>, register: Option<&str>, size: u32) -> Vec<I> {
    let start = bits.iter().map(|b| b.id.index() + 1).max().unwrap_or(0);
    (0..size)
        .map(|offset| {
            let id = I::from_index(start + offset);
            bits.push(match register {
                Some(name) => Bit::in_register(id, name, offset),
                None => Bit::loose(id),
            });
            id
        })
        .collect()
}

/// Fail if a register named like one in `theirs` exists in `ours` with other bits.
fn check_registers<I: BitId>(
    ours: &[Register<I>],
    theirs: &[Register<I>],
    context: &str,
) -> IrResult<()> {
    for reg in theirs {
        if ours.iter().any(|r| r.name() == reg.name() && r != reg) {
            return Err(IrError::RegisterConflict(format!(
                "{} '{}' is laid out differently in {context}",
                I::DECL,
                reg.name()
            )));
        }
    }
    Ok(())
}

/// Adopt bits and registers from `theirs` that `ours` lacks.
fn adopt<I: BitId>(
    bits: &mut Vec<Bit<I>>,
    regs: &mut Vec<Register<I>>,
    their_bits: &[Bit<I>],
    their_regs: &[Register<I>],
) -> Vec<I> {
    let mut added = Vec::new();
    for bit in their_bits {
        if bits.iter().all(|b| b.id != bit.id) {
            bits.push(bit.clone());
            added.push(bit.id);
        }
    }
    for reg in their_regs {
        if regs.iter().all(|r| r.name() != reg.name()) {
            regs.push(reg.clone());
        }
    }
    added
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: Vec::new(),
            clbits: Vec::new(),
            qregs: Vec::new(),
            cregs: Vec::new(),
            dag: CircuitDag::new(),
        }
    }

    /// A circuit of `num_qubits` and `num_clbits` bits outside any register.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for id in allocate(&mut circuit.qubits, None, num_qubits) {
            circuit.dag.add_qubit(id);
        }
        for id in allocate(&mut circuit.clbits, None, num_clbits) {
            circuit.dag.add_clbit(id);
        }
        circuit
    }

    /// Same bits and registers, no operations.
    pub fn empty_like(&self, name: impl Into<String>) -> Self {
        let mut dag = CircuitDag::new();
        self.qubits.iter().for_each(|q| dag.add_qubit(q.id));
        self.clbits.iter().for_each(|c| dag.add_clbit(c.id));
        Self {
            name: name.into(),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            qregs: self.qregs.clone(),
            cregs: self.cregs.clone(),
            dag,
        }
    }

    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> QuantumRegister {
        let name = name.into();
        let ids = allocate(&mut self.qubits, Some(name.as_str()), size);
        ids.iter().for_each(|&id| self.dag.add_qubit(id));
        let register = Register::new(name, ids);
        self.qregs.push(register.clone());
        register
    }

    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> ClassicalRegister {
        let name = name.into();
        let ids = allocate(&mut self.clbits, Some(name.as_str()), size);
        ids.iter().for_each(|&id| self.dag.add_clbit(id));
        let register = Register::new(name, ids);
        self.cregs.push(register.clone());
        register
    }

    /// Append every operation of `other`.
    ///
    /// Bits and registers of `other` missing here are adopted with their ids.
    /// Shared ones must match exactly, otherwise
    /// [`IrError::RegisterConflict`] is returned before anything changes.
    pub fn compose(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        let context = format!("'{}' and '{}'", self.name, other.name);
        check_registers(&self.qregs, &other.qregs, &context)?;
        check_registers(&self.cregs, &other.cregs, &context)?;
        if let Some(clash) = other
            .qubits
            .iter()
            .find(|q| self.qubits.iter().any(|mine| mine.id == q.id && mine != *q))
        {
            return Err(IrError::RegisterConflict(format!(
                "{} is {clash} in '{}' only",
                clash.id, other.name
            )));
        }

        for id in adopt(&mut self.qubits, &mut self.qregs, &other.qubits, &other.qregs) {
            self.dag.add_qubit(id);
        }
        for id in adopt(&mut self.clbits, &mut self.cregs, &other.clbits, &other.cregs) {
            self.dag.add_clbit(id);
        }
        for (_, inst) in other.dag.topological_ops() {
            self.dag.apply(inst.clone())?;
        }
        Ok(self)
    }

    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// The adjoint circuit, see [`inverse_circuit`].
    pub fn inverse(&self) -> IrResult<Circuit> {
        inverse_circuit(self)
    }

    fn on_one(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(gate, qubit))
    }

    fn on_two(&mut self, gate: StandardGate, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(gate, a, b))
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::H, qubit)
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::X, qubit)
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::S, qubit)
    }

    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::Sdg, qubit)
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::T, qubit)
    }

    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::Ry(theta), qubit)
    }

    /// Phase `e^{i lambda}` on `|1>`.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.on_one(StandardGate::P(lambda), qubit)
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.on_two(StandardGate::CX, control, target)
    }

    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.on_two(StandardGate::Swap, a, b)
    }

    pub fn cry(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.on_two(StandardGate::CRy(theta), control, target)
    }

    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.on_two(StandardGate::CRz(theta), control, target)
    }

    pub fn cp(&mut self, lambda: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.on_two(StandardGate::CP(lambda), control, target)
    }

    /// Any gate, typically a [`CustomGate`](crate::CustomGate).
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Number of operations.
    pub fn size(&self) -> usize {
        self.dag.num_ops()
    }

    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Qubits in allocation order.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Classical bits in allocation order.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&QuantumRegister> {
        self.qregs.iter().find(|r| r.name() == name)
    }

    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name() == name)
    }

    /// Whether this exact register (name and bits) is part of the circuit.
    pub fn contains_qreg(&self, register: &QuantumRegister) -> bool {
        self.qreg(register.name()) == Some(register)
    }

    /// Operations in application order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.dag
            .topological_ops()
            .map(|(_, inst)| inst.clone())
            .collect()
    }

    pub fn properties(&self) -> CircuitProperties {
        CircuitProperties {
            size: self.dag.num_ops(),
            depth: self.dag.depth(),
            width: self.qubits.len(),
            bits: self.clbits.len(),
            factors: self.dag.num_tensor_factors(),
            operations: self.dag.count_ops(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let io = circuit.add_qreg("io", 2);
        let eigs = circuit.add_qreg("eigs", 3);
        let c = circuit.add_creg("c", 1);

        assert_eq!(io.qubits(), &[QubitId(0), QubitId(1)]);
        assert_eq!(eigs.qubit(0), Some(QubitId(2)));
        assert_eq!(c.clbit(0), Some(ClbitId(0)));
        assert_eq!(circuit.num_qubits(), 5);
        assert!(circuit.contains_qreg(&eigs));
        assert_eq!(circuit.qregs().len(), 2);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        assert_eq!(circuit.depth(), 3); // H, CX, parallel measures
    }

    #[test]
    fn test_empty_like_shares_wiring() {
        let mut base = Circuit::new("base");
        let io = base.add_qreg("io", 2);
        base.h(io.qubits()[0]).unwrap();

        let mut fragment = base.empty_like("frag");
        assert_eq!(fragment.size(), 0);
        assert_eq!(fragment.num_qubits(), 2);
        let anc = fragment.add_qreg("anc", 1);
        assert_eq!(anc.qubit(0), Some(QubitId(2)));
        fragment.cry(PI / 3.0, io.qubits()[1], QubitId(2)).unwrap();

        base.compose(&fragment).unwrap();
        assert_eq!(base.num_qubits(), 3);
        assert_eq!(base.size(), 2);
        assert!(base.qreg("anc").is_some());
        base.dag().verify_integrity().unwrap();
    }

    #[test]
    fn test_compose_rejects_conflicting_register() {
        let mut left = Circuit::new("left");
        left.add_qreg("io", 2);

        let mut right = Circuit::new("right");
        right.add_qreg("io", 3);

        assert!(matches!(
            left.compose(&right),
            Err(IrError::RegisterConflict(_))
        ));
        assert_eq!(left.size(), 0);
    }

    #[test]
    fn test_properties() {
        let mut circuit = Circuit::new("props");
        let q = circuit.add_qreg("q", 3);
        let c = circuit.add_creg("c", 1);
        circuit
            .h(q.qubits()[0])
            .unwrap()
            .cx(q.qubits()[0], q.qubits()[1])
            .unwrap()
            .measure(q.qubits()[1], c.clbits()[0])
            .unwrap();

        let props = circuit.properties();
        assert_eq!(props.size, 3);
        assert_eq!(props.depth, 3);
        assert_eq!(props.width, 3);
        assert_eq!(props.bits, 1);
        // q0-q1-c0 are connected, q2 is idle
        assert_eq!(props.factors, 2);
        assert_eq!(props.operations.get("cx"), Some(&1));
        assert_eq!(props.operations.get("measure"), Some(&1));
    }

    #[test]
    fn test_inverse_keeps_registers() {
        let mut circuit = Circuit::new("fwd");
        let q = circuit.add_qreg("q", 1);
        circuit.t(q.qubits()[0]).unwrap();
        let inv = circuit.inverse().unwrap();
        assert!(inv.contains_qreg(&q));
        assert_eq!(inv.instructions()[0].name(), "tdg");
    }
}
