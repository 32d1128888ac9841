//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use hhl_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    DEFAULT_SIMULATOR_QUBITS, ExecutionResult, ExperimentHeader, ExperimentResult, HalError,
    HalResult, ValidationResult, validate_against,
};
use hhl_ir::{Circuit, InstructionKind, QubitId};

use crate::statevector::Statevector;

const DEFAULT_SHOTS: u32 = 1024;

/// How the simulator reports its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMethod {
    /// Final amplitudes, measurements ignored.
    Statevector,
    /// Sampled counts over the measured classical bits.
    Qasm {
        /// Shots per experiment.
        shots: u32,
    },
}

/// Local simulator backend.
///
/// Both methods evolve a dense statevector, so circuits are limited to
/// a few dozen qubits by memory.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Output mode.
    method: SimulationMethod,
    /// Sampling seed; entropy-seeded when absent.
    seed: Option<u64>,
    /// Cached capabilities.
    capabilities: Capabilities,
}

impl SimulatorBackend {
    /// Exact simulator returning final amplitudes.
    pub fn statevector() -> Self {
        Self::build(
            BackendConfig::new("statevector_simulator"),
            SimulationMethod::Statevector,
            None,
            DEFAULT_SIMULATOR_QUBITS,
        )
    }

    /// Sampling simulator returning `shots` counts per experiment.
    pub fn qasm(shots: u32) -> Self {
        Self::build(
            BackendConfig::new("qasm_simulator"),
            SimulationMethod::Qasm { shots },
            None,
            DEFAULT_SIMULATOR_QUBITS,
        )
    }

    fn build(config: BackendConfig, method: SimulationMethod, seed: Option<u64>, max_qubits: u32) -> Self {
        let capabilities = match method {
            SimulationMethod::Statevector => {
                Capabilities::statevector_simulator(config.name.clone(), max_qubits)
            }
            SimulationMethod::Qasm { .. } => {
                Capabilities::qasm_simulator(config.name.clone(), max_qubits)
            }
        };
        Self {
            config,
            method,
            seed,
            capabilities,
        }
    }

    /// Fix the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Limit the circuit width.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits;
        self
    }

    /// The output mode.
    pub fn method(&self) -> SimulationMethod {
        self.method
    }

    /// Evolve `circuit` from |0...0⟩, ignoring measurements and barriers.
    ///
    /// Qubit positions in the returned state follow ascending qubit id.
    fn evolve(circuit: &Circuit) -> HalResult<(Statevector, FxHashMap<QubitId, usize>)> {
        let mut ids: Vec<QubitId> = circuit.qubits().iter().map(|q| q.id).collect();
        ids.sort();
        let positions: FxHashMap<QubitId, usize> =
            ids.iter().enumerate().map(|(pos, id)| (*id, pos)).collect();

        let mut sv = Statevector::new(ids.len());
        for inst in circuit.instructions() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                let operands = inst
                    .qubits
                    .iter()
                    .map(|q| {
                        positions.get(q).copied().ok_or_else(|| {
                            HalError::InvalidCircuit(format!(
                                "'{}' applies {} to unknown qubit {q}",
                                circuit.name(),
                                gate.name()
                            ))
                        })
                    })
                    .collect::<HalResult<Vec<_>>>()?;
                sv.apply_gate(&gate.kind, &operands);
            }
        }
        Ok((sv, positions))
    }

    /// Run one circuit in statevector mode.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_statevector(&self, circuit: &Circuit) -> HalResult<ExperimentResult> {
        let start = Instant::now();
        let (sv, _) = Self::evolve(circuit)?;
        let elapsed = start.elapsed();
        debug!("Statevector simulation completed in {:?}", elapsed);

        Ok(
            ExperimentResult::with_statevector(
                ExperimentHeader::from_circuit(circuit),
                sv.into_amplitudes(),
            )
            .with_time_taken(elapsed.as_millis() as u64),
        )
    }

    /// Run one circuit in sampling mode.
    ///
    /// The state is computed once and `shots` outcomes are drawn from it, so
    /// a gate may not act on a qubit after that qubit is measured.
    #[instrument(skip(self, circuit, rng), fields(circuit = circuit.name()))]
    fn run_sampled(
        &self,
        circuit: &Circuit,
        shots: u32,
        rng: &mut StdRng,
    ) -> HalResult<ExperimentResult> {
        let start = Instant::now();

        let mut measured: FxHashSet<QubitId> = FxHashSet::default();
        let mut measurements = Vec::new();
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        measured.insert(*q);
                        measurements.push((*q, *c));
                    }
                }
                InstructionKind::Gate(gate) => {
                    if let Some(q) = measured.iter().find(|q| inst.acts_on(**q)) {
                        return Err(HalError::Unsupported(format!(
                            "'{}' applies {} to qubit {q} after measuring it",
                            circuit.name(),
                            gate.name()
                        )));
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        let (sv, positions) = Self::evolve(circuit)?;
        let header = ExperimentHeader::from_circuit(circuit);

        let slots: FxHashMap<_, usize> = circuit
            .clbits()
            .iter()
            .enumerate()
            .map(|(slot, c)| (c.id, slot))
            .collect();
        let wiring = measurements
            .iter()
            .filter_map(|(q, c)| Some((*positions.get(q)?, *slots.get(c)?)))
            .collect::<Vec<_>>();

        debug!(
            "Sampling {} shots over {} measured qubits",
            shots,
            wiring.len()
        );

        let mut counts = Counts::new();
        if !wiring.is_empty() {
            for (outcome, hits) in sv.sample_histogram(shots, rng) {
                let mut bits = vec![false; header.memory_slots as usize];
                for (pos, slot) in &wiring {
                    bits[*slot] = (outcome >> pos) & 1 == 1;
                }
                counts.insert(header.format_key(&bits), hits);
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);
        Ok(ExperimentResult::with_counts(header, shots, counts)
            .with_time_taken(elapsed.as_millis() as u64))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::statevector()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuits), fields(batch = circuits.len()))]
    async fn execute(&self, circuits: &[Circuit]) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        for circuit in circuits {
            if circuit.num_qubits() > self.capabilities.num_qubits as usize {
                return Err(HalError::CircuitTooLarge(format!(
                    "Circuit '{}' has {} qubits but simulator only supports {}",
                    circuit.name(),
                    circuit.num_qubits(),
                    self.capabilities.num_qubits
                )));
            }
            if let ValidationResult::Invalid { reasons } =
                validate_against(&self.capabilities, circuit)
            {
                return Err(HalError::InvalidCircuit(reasons.join("; ")));
            }
        }

        let job_id = Uuid::new_v4().to_string();
        debug!("Executing job {} with {} circuits", job_id, circuits.len());

        let results = match self.method {
            SimulationMethod::Statevector => circuits
                .iter()
                .map(|c| self.run_statevector(c))
                .collect::<HalResult<Vec<_>>>()?,
            SimulationMethod::Qasm { shots } => {
                if shots == 0 || shots > self.capabilities.max_shots {
                    return Err(HalError::InvalidShots(format!(
                        "{shots} shots requested, simulator accepts 1..={}",
                        self.capabilities.max_shots
                    )));
                }
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                circuits
                    .iter()
                    .map(|c| self.run_sampled(c, shots, &mut rng))
                    .collect::<HalResult<Vec<_>>>()?
            }
        };

        Ok(ExecutionResult::new(self.config.name.clone(), job_id, results)
            .with_execution_time(start.elapsed().as_millis() as u64))
    }
}

impl BackendFactory for SimulatorBackend {
    /// Reads `method` (`"statevector"` or `"qasm"`, defaulting from the
    /// backend name), `shots`, `seed` and `max_qubits`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra_u64("max_qubits")
            .map_or(DEFAULT_SIMULATOR_QUBITS, |v| v as u32);
        let seed = config.extra_u64("seed");

        let method_name = config.extra_str("method").map_or_else(
            || {
                if config.name.contains("qasm") {
                    "qasm".to_string()
                } else {
                    "statevector".to_string()
                }
            },
            str::to_lowercase,
        );
        let method = match method_name.as_str() {
            "statevector" => SimulationMethod::Statevector,
            "qasm" => SimulationMethod::Qasm {
                shots: config
                    .extra_u64("shots")
                    .map_or(DEFAULT_SHOTS, |v| v as u32),
            },
            other => {
                return Err(HalError::Configuration(format!(
                    "unknown simulation method '{other}'"
                )));
            }
        };

        Ok(Self::build(config, method, seed, max_qubits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hhl_ir::ClbitId;

    fn bell(measured: bool) -> Circuit {
        let mut circuit = Circuit::new("bell");
        let q = circuit.add_qreg("q", 2);
        let c = circuit.add_creg("c", 2);
        circuit.h(q.qubits()[0]).unwrap();
        circuit.cx(q.qubits()[0], q.qubits()[1]).unwrap();
        if measured {
            circuit.measure(q.qubits()[0], c.clbits()[0]).unwrap();
            circuit.measure(q.qubits()[1], c.clbits()[1]).unwrap();
        }
        circuit
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::statevector();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert!(backend.is_statevector());
        assert_eq!(caps.num_qubits, DEFAULT_SIMULATOR_QUBITS);
        assert!(!SimulatorBackend::qasm(10).is_statevector());
    }

    #[tokio::test]
    async fn test_statevector_bell() {
        let backend = SimulatorBackend::statevector();
        let result = backend.execute(&[bell(true)]).await.unwrap();

        let sv = result.get_statevector(0).unwrap();
        assert_eq!(sv.len(), 4);
        assert!((sv[0].norm_sqr() - 0.5).abs() < 1e-12);
        assert!((sv[3].norm_sqr() - 0.5).abs() < 1e-12);
        assert!(result.get_counts(0).is_err());
    }

    #[tokio::test]
    async fn test_qasm_bell_counts() {
        let backend = SimulatorBackend::qasm(1000).with_seed(11);
        let result = backend.execute(&[bell(true)]).await.unwrap();

        let counts = result.get_counts(0).unwrap();
        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_qasm_seed_reproducible() {
        let a = SimulatorBackend::qasm(256).with_seed(5);
        let b = SimulatorBackend::qasm(256).with_seed(5);
        let ra = a.execute(&[bell(true)]).await.unwrap();
        let rb = b.execute(&[bell(true)]).await.unwrap();
        assert_eq!(ra.get_counts(0).unwrap(), rb.get_counts(0).unwrap());
    }

    #[tokio::test]
    async fn test_qasm_register_grouped_keys() {
        let mut circuit = Circuit::new("grouped");
        let q = circuit.add_qreg("q", 3);
        let c = circuit.add_creg("c", 2);
        let ca = circuit.add_creg("ca", 1);
        circuit.x(q.qubits()[0]).unwrap();
        circuit.x(q.qubits()[2]).unwrap();
        circuit.measure(q.qubits()[0], c.clbits()[0]).unwrap();
        circuit.measure(q.qubits()[1], c.clbits()[1]).unwrap();
        circuit.measure(q.qubits()[2], ca.clbits()[0]).unwrap();

        let backend = SimulatorBackend::qasm(50).with_seed(1);
        let result = backend.execute(&[circuit]).await.unwrap();
        assert_eq!(result.get_counts(0).unwrap().get("1 01"), 50);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let mut flipped = Circuit::with_size("flipped", 1, 1);
        flipped.x(QubitId(0)).unwrap();
        flipped.measure(QubitId(0), ClbitId(0)).unwrap();
        let mut idle = Circuit::with_size("idle", 1, 1);
        idle.measure(QubitId(0), ClbitId(0)).unwrap();

        let backend = SimulatorBackend::qasm(10).with_seed(0);
        let result = backend.execute(&[flipped, idle]).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.results[0].name(), "flipped");
        assert_eq!(result.get_counts(0).unwrap().get("1"), 10);
        assert_eq!(result.get_counts_by_name("idle").unwrap().get("0"), 10);
    }

    #[tokio::test]
    async fn test_gate_after_measure_rejected() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();

        let backend = SimulatorBackend::qasm(10);
        let result = backend.execute(&[circuit]).await;
        assert!(matches!(result, Err(HalError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::statevector().with_max_qubits(5);

        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.execute(&[circuit]).await;

        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("qasm_simulator")
            .with_extra("shots", serde_json::json!(64))
            .with_extra("seed", serde_json::json!(9))
            .with_extra("max_qubits", serde_json::json!(8));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.method(), SimulationMethod::Qasm { shots: 64 });
        assert_eq!(backend.capabilities().num_qubits, 8);
        assert_eq!(backend.seed, Some(9));

        let sv = SimulatorBackend::from_config(BackendConfig::new("statevector_simulator")).unwrap();
        assert_eq!(sv.method(), SimulationMethod::Statevector);
        assert_eq!(
            sv.capabilities().num_qubits,
            SimulatorBackend::statevector().capabilities().num_qubits
        );

        let bad = SimulatorBackend::from_config(
            BackendConfig::new("sim").with_extra("method", serde_json::json!("density")),
        );
        assert!(matches!(bad, Err(HalError::Configuration(_))));
    }
}
