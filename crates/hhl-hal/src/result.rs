//! Execution results.
//!
//! An [`ExecutionResult`] holds one [`ExperimentResult`] per executed
//! circuit. Count keys follow the usual register-grouped layout: registers in
//! reverse declaration order separated by a space, each register written most
//! significant bit first. A circuit with registers `c` (2 bits) then `ca`
//! (1 bit) produces keys like `"1 01"`, where `1` is `ca[0]` and `01` is
//! `c[1] c[0]`.

use std::collections::BTreeMap;
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use hhl_ir::Circuit;

use crate::error::{HalError, HalResult};

/// Measurement histogram keyed by register-grouped bitstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(bitstring, count)` pairs; repeated keys accumulate.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut counts = Self::new();
        for (key, count) in pairs {
            counts.insert(key, count);
        }
        counts
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring` (0 if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate outcomes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Outcomes sorted by descending count, ties broken by key.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("'{k}': {v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Classical layout of an executed circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentHeader {
    /// Circuit name.
    pub name: String,
    /// `(register, size)` in declaration order.
    pub creg_sizes: Vec<(String, u32)>,
    /// `(register, index)` per memory slot.
    pub clbit_labels: Vec<(String, u32)>,
    /// Number of classical bits.
    pub memory_slots: u32,
    /// Number of qubits.
    pub n_qubits: u32,
}

impl ExperimentHeader {
    /// Describe the classical layout of `circuit`.
    ///
    /// Bits outside any register are grouped into an unnamed register that
    /// sorts before the named ones.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut creg_sizes = Vec::new();
        let mut clbit_labels = Vec::with_capacity(circuit.num_clbits());

        let mut loose = 0u32;
        for clbit in circuit.clbits() {
            if let Some(slot) = &clbit.slot {
                clbit_labels.push(slot.clone());
            } else {
                clbit_labels.push((String::new(), loose));
                loose += 1;
            }
        }
        if loose > 0 {
            creg_sizes.push((String::new(), loose));
        }
        creg_sizes.extend(
            circuit
                .cregs()
                .iter()
                .map(|r| (r.name().to_string(), r.len() as u32)),
        );

        Self {
            name: circuit.name().to_string(),
            creg_sizes,
            memory_slots: clbit_labels.len() as u32,
            clbit_labels,
            n_qubits: circuit.num_qubits() as u32,
        }
    }

    /// Format classical bit values (indexed by memory slot) as a count key.
    pub fn format_key(&self, bits: &[bool]) -> String {
        let mut groups = Vec::with_capacity(self.creg_sizes.len());
        for (name, size) in self.creg_sizes.iter().rev() {
            let group: String = (0..*size)
                .rev()
                .map(|idx| {
                    let set = self
                        .clbit_labels
                        .iter()
                        .position(|(reg, i)| reg == name && *i == idx)
                        .and_then(|slot| bits.get(slot).copied())
                        .unwrap_or(false);
                    if set { '1' } else { '0' }
                })
                .collect();
            groups.push(group);
        }
        groups.join(" ")
    }
}

/// Raw output of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentData {
    /// Measurement histogram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    /// Final amplitudes, little-endian over qubit ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<Complex64>>,
}

/// Result of executing one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Classical layout.
    pub header: ExperimentHeader,
    /// Shots taken.
    pub shots: u32,
    /// Output data.
    pub data: ExperimentData,
    /// Wall-clock time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_ms: Option<u64>,
}

impl ExperimentResult {
    /// Result carrying counts.
    pub fn with_counts(header: ExperimentHeader, shots: u32, counts: Counts) -> Self {
        Self {
            header,
            shots,
            data: ExperimentData {
                counts: Some(counts),
                statevector: None,
            },
            time_taken_ms: None,
        }
    }

    /// Result carrying final amplitudes.
    pub fn with_statevector(header: ExperimentHeader, statevector: Vec<Complex64>) -> Self {
        Self {
            header,
            shots: 1,
            data: ExperimentData {
                counts: None,
                statevector: Some(statevector),
            },
            time_taken_ms: None,
        }
    }

    /// Attach a timing.
    #[must_use]
    pub fn with_time_taken(mut self, millis: u64) -> Self {
        self.time_taken_ms = Some(millis);
        self
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.header.name
    }
}

/// Result of executing a batch of circuits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Backend that produced the result.
    pub backend_name: String,
    /// Identifier of the execution.
    pub job_id: String,
    /// One entry per submitted circuit, in submission order.
    pub results: Vec<ExperimentResult>,
    /// Total wall-clock time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a result.
    pub fn new(
        backend_name: impl Into<String>,
        job_id: impl Into<String>,
        results: Vec<ExperimentResult>,
    ) -> Self {
        Self {
            backend_name: backend_name.into(),
            job_id: job_id.into(),
            results,
            execution_time_ms: None,
        }
    }

    /// Attach a total timing.
    #[must_use]
    pub fn with_execution_time(mut self, millis: u64) -> Self {
        self.execution_time_ms = Some(millis);
        self
    }

    /// Number of experiments.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether there are no experiments.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Experiment by position.
    pub fn experiment(&self, index: usize) -> HalResult<&ExperimentResult> {
        self.results.get(index).ok_or_else(|| {
            HalError::MissingResult(format!(
                "no experiment at index {index} (result has {})",
                self.results.len()
            ))
        })
    }

    /// Experiment by circuit name.
    pub fn experiment_by_name(&self, name: &str) -> HalResult<&ExperimentResult> {
        self.results
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| HalError::MissingResult(format!("no experiment named '{name}'")))
    }

    /// Counts of the experiment at `index`.
    pub fn get_counts(&self, index: usize) -> HalResult<&Counts> {
        let experiment = self.experiment(index)?;
        experiment.data.counts.as_ref().ok_or_else(|| {
            HalError::MissingResult(format!("experiment '{}' has no counts", experiment.name()))
        })
    }

    /// Counts of the experiment named `name`.
    pub fn get_counts_by_name(&self, name: &str) -> HalResult<&Counts> {
        self.experiment_by_name(name)?
            .data
            .counts
            .as_ref()
            .ok_or_else(|| HalError::MissingResult(format!("experiment '{name}' has no counts")))
    }

    /// Final amplitudes of the experiment at `index`.
    pub fn get_statevector(&self, index: usize) -> HalResult<&[Complex64]> {
        let experiment = self.experiment(index)?;
        experiment.data.statevector.as_deref().ok_or_else(|| {
            HalError::MissingResult(format!(
                "experiment '{}' has no statevector",
                experiment.name()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::from_pairs([("00", 10), ("11", 30)]);
        counts.insert("00", 5);
        assert_eq!(counts.get("00"), 15);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 45);
        assert_eq!(counts.most_frequent(), Some((&"11".to_string(), &30)));
        assert_eq!(counts.to_string(), "{'00': 15, '11': 30}");
    }

    #[test]
    fn test_header_from_circuit_and_key_layout() {
        let mut circuit = Circuit::new("tomo");
        circuit.add_qreg("io", 2);
        circuit.add_creg("c", 2);
        circuit.add_creg("ca", 1);

        let header = ExperimentHeader::from_circuit(&circuit);
        assert_eq!(
            header.creg_sizes,
            vec![("c".to_string(), 2), ("ca".to_string(), 1)]
        );
        assert_eq!(header.memory_slots, 3);
        assert_eq!(header.clbit_labels[2], ("ca".to_string(), 0));

        // slots: c[0]=1, c[1]=0, ca[0]=1
        assert_eq!(header.format_key(&[true, false, true]), "1 01");
    }

    #[test]
    fn test_loose_clbits_form_trailing_group() {
        let mut circuit = Circuit::with_size("loose", 2, 2);
        circuit.add_creg("r", 1);
        let header = ExperimentHeader::from_circuit(&circuit);
        assert_eq!(header.creg_sizes[0], (String::new(), 2));
        assert_eq!(header.format_key(&[false, true, true]), "1 10");
    }

    #[test]
    fn test_lookup_errors() {
        let mut circuit = Circuit::new("only");
        circuit.add_creg("c", 1);
        let header = ExperimentHeader::from_circuit(&circuit);
        let result = ExecutionResult::new(
            "sim",
            "job-1",
            vec![ExperimentResult::with_counts(
                header,
                10,
                Counts::from_pairs([("1", 10)]),
            )],
        );

        assert_eq!(result.get_counts(0).unwrap().total_shots(), 10);
        assert_eq!(result.get_counts_by_name("only").unwrap().get("1"), 10);
        assert!(matches!(result.get_counts(1), Err(HalError::MissingResult(_))));
        assert!(matches!(
            result.get_statevector(0),
            Err(HalError::MissingResult(_))
        ));
        assert!(result.get_counts_by_name("other").is_err());
    }
}
