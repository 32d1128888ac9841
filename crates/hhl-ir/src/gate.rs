//! Gates: a fixed standard set plus explicit unitaries.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Gates with fixed semantics, named as in OpenQASM.
///
/// Angles are bound radians; circuits here are never parameterised.
/// Controlled gates take their control first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    SXdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// `diag(1, e^{i lambda})`.
    P(f64),
    /// `U(theta, phi, lambda)`.
    U(f64, f64, f64),
    CX,
    CY,
    CZ,
    CH,
    Swap,
    CRx(f64),
    CRy(f64),
    CRz(f64),
    CP(f64),
    CCX,
    CSwap,
}

impl StandardGate {
    #[allow(clippy::enum_glob_use)]
    pub fn name(&self) -> &'static str {
        use StandardGate::*;
        match self {
            I => "id",
            X => "x",
            Y => "y",
            Z => "z",
            H => "h",
            S => "s",
            Sdg => "sdg",
            T => "t",
            Tdg => "tdg",
            SX => "sx",
            SXdg => "sxdg",
            Rx(_) => "rx",
            Ry(_) => "ry",
            Rz(_) => "rz",
            P(_) => "p",
            U(..) => "u",
            CX => "cx",
            CY => "cy",
            CZ => "cz",
            CH => "ch",
            Swap => "swap",
            CRx(_) => "crx",
            CRy(_) => "cry",
            CRz(_) => "crz",
            CP(_) => "cp",
            CCX => "ccx",
            CSwap => "cswap",
        }
    }

    #[allow(clippy::enum_glob_use)]
    pub fn num_qubits(&self) -> u32 {
        use StandardGate::*;
        match self {
            CCX | CSwap => 3,
            CX | CY | CZ | CH | Swap | CRx(_) | CRy(_) | CRz(_) | CP(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    Standard(StandardGate),
    Custom(CustomGate),
}

/// A gate defined by its unitary matrix.
///
/// The matrix is row-major, `2^n × 2^n`, and indexed little-endian over the
/// gate's operands: the first qubit the gate is applied to is bit 0 of the
/// row/column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    pub name: String,
    pub num_qubits: u32,
    matrix: Vec<Complex64>,
}

impl CustomGate {
    /// Wrap a `2^n x 2^n` row-major unitary.
    ///
    /// Only the shape is checked, not unitarity.
    pub fn unitary(
        name: impl Into<String>,
        num_qubits: u32,
        matrix: Vec<Complex64>,
    ) -> IrResult<Self> {
        let name = name.into();
        let dim = 1usize << num_qubits;
        if matrix.len() != dim * dim {
            return Err(IrError::MatrixDimension {
                op: name,
                expected: dim * dim,
                got: matrix.len(),
            });
        }
        Ok(Self {
            name,
            num_qubits,
            matrix,
        })
    }

    pub fn matrix(&self) -> &[Complex64] {
        &self.matrix
    }

    /// Side length of the unitary.
    pub fn dim(&self) -> usize {
        1usize << self.num_qubits
    }

    /// The conjugate-transposed gate, named `<name>_dg`.
    ///
    /// Applying `adjoint()` to a gate named `x_dg` gives back `x`.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        let dim = self.dim();
        let matrix = (0..dim * dim)
            .map(|k| self.matrix[(k % dim) * dim + k / dim].conj())
            .collect();
        let name = match self.name.strip_suffix("_dg") {
            Some(base) => base.to_string(),
            None => format!("{}_dg", self.name),
        };
        Self {
            name,
            num_qubits: self.num_qubits,
            matrix,
        }
    }
}

/// A gate as placed in an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: GateKind,
}

impl Gate {
    pub fn name(&self) -> &str {
        match &self.kind {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    pub fn num_qubits(&self) -> u32 {
        match &self.kind {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate {
            kind: GateKind::Standard(gate),
        }
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate {
            kind: GateKind::Custom(gate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_and_names() {
        assert_eq!(StandardGate::Sdg.num_qubits(), 1);
        assert_eq!(StandardGate::CP(0.1).num_qubits(), 2);
        assert_eq!(StandardGate::CSwap.num_qubits(), 3);
        assert_eq!(StandardGate::CRy(0.3).name(), "cry");
        assert_eq!(Gate::from(StandardGate::I).name(), "id");
    }

    #[test]
    fn test_unitary_shape_checked() {
        let err = CustomGate::unitary("bad", 1, vec![Complex64::new(1.0, 0.0); 3]).unwrap_err();
        assert!(matches!(
            err,
            IrError::MatrixDimension {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_adjoint_conjugates_and_transposes() {
        let zero = Complex64::new(0.0, 0.0);
        let a = Complex64::new(0.0, 0.5);
        let b = Complex64::new(0.25, -1.0);
        let gate = CustomGate::unitary("m", 1, vec![zero, a, b, zero]).unwrap();

        let adj = gate.adjoint();
        assert_eq!(adj.name, "m_dg");
        assert_eq!(adj.matrix(), &[zero, b.conj(), a.conj(), zero]);
        assert_eq!(adj.adjoint(), gate);
        assert_eq!(Gate::from(adj).num_qubits(), 1);
    }
}
