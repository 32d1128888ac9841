//! What a backend can run and how it reports results.
//!
//! The solver only branches on one thing here: a backend advertising
//! [`FEATURE_STATEVECTOR`] is read through amplitudes, any other backend
//! through counts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const FEATURE_STATEVECTOR: &str = "statevector";
pub const FEATURE_COUNTS: &str = "counts";
/// Accepts [`CustomGate`](hhl_ir::CustomGate) unitaries.
pub const FEATURE_UNITARY: &str = "unitary";

/// Width cap of the local simulators unless configured otherwise.
pub const DEFAULT_SIMULATOR_QUBITS: u32 = 24;

const STANDARD_GATES: &[&str] = &[
    "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p", "u",
    "cx", "cy", "cz", "ch", "swap", "crx", "cry", "crz", "cp", "ccx", "cswap",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub num_qubits: u32,
    pub gate_set: GateSet,
    /// Upper bound on shots per experiment; 1 for exact simulators.
    pub max_shots: u32,
    pub is_simulator: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    fn simulator(name: impl Into<String>, num_qubits: u32, max_shots: u32, output: &str) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots,
            is_simulator: true,
            features: vec![output.to_string(), FEATURE_UNITARY.to_string()],
        }
    }

    /// Exact simulator returning the final amplitudes.
    pub fn statevector_simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self::simulator(name, num_qubits, 1, FEATURE_STATEVECTOR)
    }

    /// Sampling simulator returning counts.
    pub fn qasm_simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self::simulator(name, num_qubits, 1_000_000, FEATURE_COUNTS)
    }

    pub fn supports(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn is_statevector(&self) -> bool {
        self.supports(FEATURE_STATEVECTOR)
    }
}

/// Standard gate names a backend accepts, lower-case as the IR prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateSet(BTreeSet<String>);

impl GateSet {
    /// Every standard gate the IR defines.
    pub fn universal() -> Self {
        STANDARD_GATES.iter().copied().collect()
    }

    pub fn contains(&self, gate: &str) -> bool {
        self.0.contains(gate)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for GateSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_feature_selects_read_out() {
        let sv = Capabilities::statevector_simulator("sv", 10);
        assert!(sv.is_statevector());
        assert_eq!(sv.max_shots, 1);

        let qasm = Capabilities::qasm_simulator("qasm", 10);
        assert!(!qasm.is_statevector());
        assert!(qasm.supports(FEATURE_COUNTS));
        assert!(qasm.supports(FEATURE_UNITARY));
    }

    #[test]
    fn test_gate_set_membership() {
        let gates = GateSet::universal();
        assert!(gates.contains("cry"));
        assert!(gates.contains("cswap"));
        assert!(!gates.contains("iswap"));

        let narrow: GateSet = ["h", "cx"].into_iter().collect();
        assert_eq!(narrow.len(), 2);
        assert!(!narrow.contains("ry"));
    }
}
