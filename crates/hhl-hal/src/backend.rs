//! The [`Backend`] trait and its construction options.
//!
//! The solver hands a backend every circuit it needs in one
//! [`Backend::execute`] call and reads the answer back either as final
//! amplitudes or as measured counts, depending on
//! [`Backend::is_statevector`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hhl_ir::{Circuit, GateKind, InstructionKind};

use crate::capability::{Capabilities, FEATURE_UNITARY};
use crate::error::HalResult;
use crate::result::ExecutionResult;

/// Name plus free-form options (`shots`, `seed`, `method`, `max_qubits`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Option `key` as an unsigned integer, if present and of that type.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key)?.as_u64()
    }

    /// Option `key` as a string, if present and of that type.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key)?.as_str()
    }
}

/// Something that runs circuits.
///
/// `execute` returns one experiment per submitted circuit, in submission
/// order, each named after its circuit. `capabilities` is fixed at
/// construction.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// True when results carry final amplitudes rather than counts.
    fn is_statevector(&self) -> bool {
        self.capabilities().is_statevector()
    }

    async fn availability(&self) -> HalResult<BackendAvailability>;

    async fn execute(&self, circuits: &[Circuit]) -> HalResult<ExecutionResult>;
}

/// Build a backend from a [`BackendConfig`]; what the registry calls.
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

/// Whether a backend will take work right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAvailability {
    pub is_available: bool,
    pub status_message: Option<String>,
}

impl BackendAvailability {
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            status_message: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            status_message: Some(reason.into()),
        }
    }
}

/// Outcome of [`validate_against`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Check width, gate names and custom-unitary use against `caps`.
///
/// Every problem found is reported, each distinct reason once.
pub fn validate_against(caps: &Capabilities, circuit: &Circuit) -> ValidationResult {
    let mut reasons = Vec::new();

    if circuit.num_qubits() > caps.num_qubits as usize {
        reasons.push(format!(
            "circuit '{}' needs {} qubits, '{}' has {}",
            circuit.name(),
            circuit.num_qubits(),
            caps.name,
            caps.num_qubits
        ));
    }

    let instructions = circuit.instructions();
    let gates = instructions.iter().filter_map(|inst| match &inst.kind {
        InstructionKind::Gate(gate) => Some(gate),
        InstructionKind::Measure | InstructionKind::Barrier => None,
    });
    for gate in gates {
        let reason = match &gate.kind {
            GateKind::Standard(g) if !caps.gate_set.contains(g.name()) => {
                format!("gate '{}' is not in the gate set", g.name())
            }
            GateKind::Custom(c) if !caps.supports(FEATURE_UNITARY) => {
                format!("custom unitary '{}' is not supported", c.name)
            }
            _ => continue,
        };
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    if reasons.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid { reasons }
    }
}
