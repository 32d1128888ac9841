//! Gate and circuit inversion.

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};

/// Compute the inverse of a standard gate.
///
/// For unitary gates U, this returns U† (U-dagger).
///
/// # Examples
///
/// - H† = H (Hadamard is self-inverse)
/// - S† = Sdg
/// - Rx(θ)† = Rx(-θ)
pub fn inverse_gate(gate: &StandardGate) -> StandardGate {
    match gate {
        // Self-inverse gates (Hermitian)
        StandardGate::I => StandardGate::I,
        StandardGate::X => StandardGate::X,
        StandardGate::Y => StandardGate::Y,
        StandardGate::Z => StandardGate::Z,
        StandardGate::H => StandardGate::H,
        StandardGate::CX => StandardGate::CX,
        StandardGate::CY => StandardGate::CY,
        StandardGate::CZ => StandardGate::CZ,
        StandardGate::CH => StandardGate::CH,
        StandardGate::Swap => StandardGate::Swap,
        StandardGate::CCX => StandardGate::CCX,
        StandardGate::CSwap => StandardGate::CSwap,

        StandardGate::S => StandardGate::Sdg,
        StandardGate::Sdg => StandardGate::S,
        StandardGate::T => StandardGate::Tdg,
        StandardGate::Tdg => StandardGate::T,
        StandardGate::SX => StandardGate::SXdg,
        StandardGate::SXdg => StandardGate::SX,

        // Rotation gates: negate the angle
        StandardGate::Rx(theta) => StandardGate::Rx(-theta),
        StandardGate::Ry(theta) => StandardGate::Ry(-theta),
        StandardGate::Rz(theta) => StandardGate::Rz(-theta),
        StandardGate::P(lambda) => StandardGate::P(-lambda),

        // U(θ, φ, λ)† = U(-θ, -λ, -φ)
        StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),

        StandardGate::CRx(theta) => StandardGate::CRx(-theta),
        StandardGate::CRy(theta) => StandardGate::CRy(-theta),
        StandardGate::CRz(theta) => StandardGate::CRz(-theta),
        StandardGate::CP(lambda) => StandardGate::CP(-lambda),
    }
}

/// Check whether a standard gate is its own inverse.
pub fn is_self_inverse(gate: &StandardGate) -> bool {
    inverse_gate(gate) == *gate
}

/// Compute the inverse of an instruction.
///
/// Standard gates invert algebraically, custom gates by conjugate transpose of
/// their unitary. Barriers are kept as is; measurements have no inverse.
pub fn inverse_instruction(instruction: &Instruction) -> IrResult<Instruction> {
    match &instruction.kind {
        InstructionKind::Gate(gate) => {
            let kind = match &gate.kind {
                GateKind::Standard(std_gate) => GateKind::Standard(inverse_gate(std_gate)),
                GateKind::Custom(custom) => GateKind::Custom(custom.adjoint()),
            };
            Ok(Instruction {
                kind: InstructionKind::Gate(Gate { kind }),
                qubits: instruction.qubits.clone(),
                clbits: instruction.clbits.clone(),
            })
        }
        InstructionKind::Barrier => Ok(instruction.clone()),
        InstructionKind::Measure => Err(IrError::NonInvertible("measure".into())),
    }
}

/// Build the adjoint of a circuit: every instruction inverted, in reverse order.
///
/// The result shares the input's wiring (same bits and registers) and is
/// named `<name>_dg`.
pub fn inverse_circuit(circuit: &Circuit) -> IrResult<Circuit> {
    let mut inverse = circuit.empty_like(format!("{}_dg", circuit.name()));
    let ops: Vec<&Instruction> = circuit.dag().topological_ops().map(|(_, i)| i).collect();
    for inst in ops.into_iter().rev() {
        inverse.append(inverse_instruction(inst)?)?;
    }
    Ok(inverse)
}
