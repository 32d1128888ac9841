//! Turning backend output into a solution vector.
//!
//! Two read-out strategies feed one rescaling step:
//!
//! ```text
//!   statevector:  amplitudes ──decode──→ success slice ──normalize──┐
//!                                                                   ├──→ rescale
//!   counts:       tomography batch ──postselect──→ fit ρ ──diag(ρ)──┘
//! ```
//!
//! Count keys of the measured tomography variants have the ancilla register
//! first: `"1 01"` is ancilla `1`, io bits `01`.

use hhl_hal::{Counts, ExecutionResult, ExperimentResult};
use hhl_ir::{Circuit, QubitId};
use num_complex::Complex64;

use crate::error::{HhlError, HhlResult};
use crate::linalg::{Matrix, Vector, inner_self, norm, truncate_vector};

/// Classical register receiving the ancilla in tomography variants.
pub const ANCILLA_CREG: &str = "ca";

/// Success/failure split of one experiment's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountPartition {
    /// Shots with the ancilla measured as `1`.
    pub success: u64,
    /// Shots with the ancilla measured as `0`.
    pub failure: u64,
}

impl CountPartition {
    /// Total shots.
    pub fn total(&self) -> u64 {
        self.success + self.failure
    }

    /// `success / total`, `None` without shots.
    pub fn ratio(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.success as f64 / total as f64)
    }
}

/// Clones of `variants` that also measure `ancilla` into a one-bit `ca` register.
pub fn measure_ancilla(variants: &[Circuit], ancilla: QubitId) -> HhlResult<Vec<Circuit>> {
    variants
        .iter()
        .map(|variant| {
            let mut circuit = variant.clone();
            let ca = circuit.add_creg(ANCILLA_CREG, 1);
            circuit.measure(ancilla, ca.clbits()[0])?;
            Ok(circuit)
        })
        .collect()
}

fn split_key(key: &str) -> HhlResult<(&str, &str)> {
    key.split_once(' ')
        .ok_or_else(|| HhlError::MalformedCounts(key.to_string()))
}

fn counts_of(experiment: &ExperimentResult) -> HhlResult<&Counts> {
    experiment
        .data
        .counts
        .as_ref()
        .ok_or_else(|| HhlError::MissingData {
            experiment: experiment.name().to_string(),
            kind: "counts",
        })
}

/// Split counts by the leading ancilla group.
pub fn partition_counts(counts: &Counts) -> HhlResult<CountPartition> {
    let mut partition = CountPartition::default();
    for (key, &count) in counts.iter() {
        let (ancilla, _) = split_key(key)?;
        if ancilla == "1" {
            partition.success += count;
        } else {
            partition.failure += count;
        }
    }
    Ok(partition)
}

/// Success ratio of every experiment, in experiment order.
pub fn success_ratios(records: &ExecutionResult) -> HhlResult<Vec<f64>> {
    records
        .results
        .iter()
        .map(|experiment| {
            partition_counts(counts_of(experiment)?)?
                .ratio()
                .ok_or_else(|| HhlError::EmptyCounts(experiment.name().to_string()))
        })
        .collect()
}

/// Keep only success-branch shots, re-keyed by the io bits.
///
/// Returns a new result; the last classical register (the ancilla) is
/// removed from every header.
pub fn postselect(records: &ExecutionResult) -> HhlResult<ExecutionResult> {
    let mut results = Vec::with_capacity(records.len());
    for experiment in &records.results {
        let mut counts = Counts::new();
        for (key, &count) in counts_of(experiment)?.iter() {
            let (ancilla, io) = split_key(key)?;
            if ancilla == "1" {
                counts.insert(io, count);
            }
        }

        let mut header = experiment.header.clone();
        header.creg_sizes.pop();
        header.clbit_labels.pop();
        header.memory_slots = header.memory_slots.saturating_sub(1);

        let mut selected = experiment.clone();
        selected.header = header;
        selected.data.counts = Some(counts);
        results.push(selected);
    }

    let mut selected = records.clone();
    selected.results = results;
    Ok(selected)
}

/// Success-branch io amplitudes read from a statevector.
#[derive(Debug, Clone, PartialEq)]
pub struct StatevectorReadout {
    /// Decoded vector, normalized to unit length.
    pub normalized: Vector,
    /// `Re⟨t|t⟩` of the truncated, unnormalized decoded vector.
    pub probability: f64,
}

/// Normalize a decoded success slice and measure its truncated weight.
pub fn read_statevector(decoded: &Vector, original_dimension: usize) -> HhlResult<StatevectorReadout> {
    let truncated = truncate_vector(decoded, original_dimension);
    let probability = inner_self(&truncated).re;

    let length = norm(decoded);
    if length == 0.0 {
        return Err(HhlError::Component(
            "success branch of the statevector is empty".to_string(),
        ));
    }
    Ok(StatevectorReadout {
        normalized: decoded.mapv(|z| z / length),
        probability,
    })
}

/// `diag(ρ) / sqrt(Σ diag(ρ)²)`, in complex arithmetic.
pub fn density_diagonal(rho: &Matrix) -> HhlResult<Vector> {
    let diagonal = rho.diag().to_owned();
    let sum_sq: Complex64 = diagonal.iter().map(|d| d * d).sum();
    let denominator = sum_sq.sqrt();
    if denominator.norm() == 0.0 {
        return Err(HhlError::Component(
            "fitted density matrix has an empty diagonal".to_string(),
        ));
    }
    Ok(diagonal.mapv(|d| d / denominator))
}

/// Output of [`rescale`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rescaled {
    /// `scale · decoded · e^{-i·phase}`.
    pub solution: Vector,
    /// Magnitude factor `‖b‖ / ‖A·decoded‖`.
    pub scale: f64,
    /// Phase correction.
    pub phase: f64,
}

/// Recover magnitude and global phase of a unit-norm decoded vector.
///
/// All three inputs are already truncated to the original dimension. The
/// phase is `Σ_i arg(b_i·conj(p_i) − 1 + 1) / log2(dim)` with `p = A·decoded`;
/// the `− 1 + 1` turns a `(-0, -0)` product into `+0`. A one-dimensional
/// system gets phase 0, so its solution is only correct up to a global
/// phase: `2x = i` comes back as `0.5`, not `0.5i`.
pub fn rescale(decoded: &Vector, matrix: &Matrix, vector: &Vector) -> HhlResult<Rescaled> {
    let probe = matrix.dot(decoded);
    let probe_norm = norm(&probe);
    if probe_norm == 0.0 {
        return Err(HhlError::Component(
            "decoded vector is annihilated by the matrix".to_string(),
        ));
    }
    let scale = norm(vector) / probe_norm;

    let divisor = (matrix.nrows() as f64).log2();
    let phase = if divisor == 0.0 {
        0.0
    } else {
        vector
            .iter()
            .zip(probe.iter())
            .map(|(b, p)| (b * p.conj() - 1.0 + 1.0).arg())
            .sum::<f64>()
            / divisor
    };

    let factor = Complex64::from_polar(scale, -phase);
    Ok(Rescaled {
        solution: decoded.mapv(|z| z * factor),
        scale,
        phase,
    })
}
