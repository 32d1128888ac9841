//! State tomography of the io register.
//!
//! [`state_tomography_circuits`] expands a circuit into one variant per
//! product basis `{X, Y, Z}^n` over the io register. Variants are named
//! `<circuit>_tomo_<labels>`, label of io qubit 0 first, and measure io
//! qubit `q` into bit `q` of a fresh `c` register.
//!
//! [`LinearInversionFitter`] inverts the Pauli expansion
//! `ρ = 2^-n Σ_P ⟨P⟩ P`, estimating each `⟨P⟩` from every variant whose
//! bases agree with `P` on its support.

use std::fmt;

use hhl_hal::{Counts, ExecutionResult};
use hhl_ir::{Circuit, QuantumRegister};
use tracing::debug;

use super::TomographyFitter;
use crate::error::{HhlError, HhlResult};
use crate::hamiltonian::{PauliOp, PauliString};
use crate::linalg::Matrix;

/// Classical register holding the io measurement.
pub const TOMOGRAPHY_REGISTER: &str = "c";

const NAME_MARKER: &str = "_tomo_";

/// Measurement basis of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TomographyBasis {
    /// Pauli-X eigenbasis.
    X,
    /// Pauli-Y eigenbasis.
    Y,
    /// Computational basis.
    Z,
}

impl TomographyBasis {
    const ALL: [TomographyBasis; 3] = [TomographyBasis::X, TomographyBasis::Y, TomographyBasis::Z];

    fn label(self) -> char {
        match self {
            TomographyBasis::X => 'X',
            TomographyBasis::Y => 'Y',
            TomographyBasis::Z => 'Z',
        }
    }

    fn from_label(label: char) -> Option<Self> {
        match label {
            'X' => Some(TomographyBasis::X),
            'Y' => Some(TomographyBasis::Y),
            'Z' => Some(TomographyBasis::Z),
            _ => None,
        }
    }

    fn matches(self, op: PauliOp) -> bool {
        matches!(
            (self, op),
            (TomographyBasis::X, PauliOp::X)
                | (TomographyBasis::Y, PauliOp::Y)
                | (TomographyBasis::Z, PauliOp::Z)
        )
    }

    /// Bases of variant `index` over `n` qubits; qubit `q` is base-3 digit `q`.
    pub fn variant(index: usize, n: usize) -> Vec<Self> {
        let mut rest = index;
        (0..n)
            .map(|_| {
                let basis = Self::ALL[rest % 3];
                rest /= 3;
                basis
            })
            .collect()
    }

    /// Bases encoded in a variant name.
    pub fn parse_name(name: &str) -> Option<Vec<Self>> {
        let (_, labels) = name.rsplit_once(NAME_MARKER)?;
        labels.chars().map(Self::from_label).collect()
    }
}

impl fmt::Display for TomographyBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One measured variant of `base` per product basis over `io`.
pub fn state_tomography_circuits(base: &Circuit, io: &QuantumRegister) -> HhlResult<Vec<Circuit>> {
    if base.creg(TOMOGRAPHY_REGISTER).is_some() {
        return Err(HhlError::Component(format!(
            "circuit '{}' already has a classical register '{TOMOGRAPHY_REGISTER}'",
            base.name()
        )));
    }
    let n = io.len();
    let count = 3usize.pow(n as u32);

    let mut variants = Vec::with_capacity(count);
    for index in 0..count {
        let bases = TomographyBasis::variant(index, n);
        let labels: String = bases.iter().map(|b| b.label()).collect();

        let mut circuit = base.clone();
        circuit.set_name(format!("{}{NAME_MARKER}{labels}", base.name()));
        let creg = circuit.add_creg(TOMOGRAPHY_REGISTER, n as u32);
        circuit.barrier(io.qubits().iter().copied())?;
        for ((&qubit, &clbit), basis) in io.qubits().iter().zip(creg.clbits()).zip(&bases) {
            match basis {
                TomographyBasis::X => {
                    circuit.h(qubit)?;
                }
                TomographyBasis::Y => {
                    circuit.sdg(qubit)?;
                    circuit.h(qubit)?;
                }
                TomographyBasis::Z => {}
            }
            circuit.measure(qubit, clbit)?;
        }
        variants.push(circuit);
    }

    debug!(variants = variants.len(), "built tomography circuits");
    Ok(variants)
}

/// Linear-inversion density matrix estimate.
///
/// No positive-semidefinite projection is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInversionFitter;

impl LinearInversionFitter {
    /// Create the fitter.
    pub fn new() -> Self {
        Self
    }
}

impl TomographyFitter for LinearInversionFitter {
    fn name(&self) -> &str {
        "linear_inversion"
    }

    fn fit(&self, records: &ExecutionResult, circuits: &[Circuit]) -> HhlResult<Matrix> {
        let mut data = Vec::with_capacity(circuits.len());
        let mut n_qubits = None;
        for circuit in circuits {
            let bases = TomographyBasis::parse_name(circuit.name()).ok_or_else(|| {
                HhlError::Component(format!("'{}' is not a tomography circuit", circuit.name()))
            })?;
            match n_qubits {
                None => n_qubits = Some(bases.len()),
                Some(n) if n != bases.len() => {
                    return Err(HhlError::Component(format!(
                        "tomography circuit '{}' measures {} qubits, expected {n}",
                        circuit.name(),
                        bases.len()
                    )));
                }
                Some(_) => {}
            }
            let counts = records.get_counts_by_name(circuit.name())?;
            data.push((bases, counts));
        }
        let n = n_qubits.ok_or_else(|| {
            HhlError::Component("no tomography circuits to fit".to_string())
        })?;

        let dim = 1usize << n;
        let mut rho = Matrix::zeros((dim, dim));
        for z_mask in 0..dim {
            for x_mask in 0..dim {
                let pauli = PauliString::from_masks(x_mask, z_mask, n as u32);
                let expectation = pauli_expectation(&pauli, &data, n)?;
                if expectation == 0.0 {
                    continue;
                }
                for col in 0..dim {
                    let (row, phase) = pauli.column_entry(col);
                    rho[[row, col]] += phase * (expectation / dim as f64);
                }
            }
        }
        Ok(rho)
    }
}

/// `⟨P⟩` averaged over compatible variants; 0 when none recorded shots.
fn pauli_expectation(
    pauli: &PauliString,
    data: &[(Vec<TomographyBasis>, &Counts)],
    n: usize,
) -> HhlResult<f64> {
    if pauli.is_identity() {
        return Ok(1.0);
    }

    let mut sum = 0.0;
    let mut used = 0usize;
    for (bases, counts) in data {
        let compatible = pauli
            .ops()
            .iter()
            .all(|&(q, op)| bases[q as usize].matches(op));
        if !compatible || counts.total_shots() == 0 {
            continue;
        }

        let mut signed = 0.0;
        for (key, &count) in counts.iter() {
            let bits = key.as_bytes();
            if bits.len() != n || bits.iter().any(|b| *b != b'0' && *b != b'1') {
                return Err(HhlError::MalformedCounts(key.clone()));
            }
            let parity = pauli
                .ops()
                .iter()
                .filter(|&&(q, _)| bits[n - 1 - q as usize] == b'1')
                .count();
            let sign = if parity % 2 == 0 { 1.0 } else { -1.0 };
            signed += sign * count as f64;
        }
        sum += signed / counts.total_shots() as f64;
        used += 1;
    }

    Ok(if used == 0 { 0.0 } else { sum / used as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hhl_hal::{ExperimentHeader, ExperimentResult};
    use num_complex::Complex64;

    fn records(circuits: &[Circuit], counts: impl Fn(&[TomographyBasis]) -> Counts) -> ExecutionResult {
        let results = circuits
            .iter()
            .map(|c| {
                let bases = TomographyBasis::parse_name(c.name()).unwrap();
                let counts = counts(&bases);
                let shots = counts.total_shots() as u32;
                ExperimentResult::with_counts(ExperimentHeader::from_circuit(c), shots, counts)
            })
            .collect();
        ExecutionResult::new("test", "job", results)
    }

    #[test]
    fn test_variant_layout_and_names() {
        let mut base = Circuit::new("hhl");
        let io = base.add_qreg("io", 2);
        let variants = state_tomography_circuits(&base, &io).unwrap();

        assert_eq!(variants.len(), 9);
        assert_eq!(variants[0].name(), "hhl_tomo_XX");
        assert_eq!(variants[1].name(), "hhl_tomo_YX");
        assert_eq!(variants[5].name(), "hhl_tomo_ZY");
        assert_eq!(
            TomographyBasis::parse_name("hhl_tomo_ZY"),
            Some(vec![TomographyBasis::Z, TomographyBasis::Y])
        );

        let zz = &variants[8];
        let ops = zz.dag().count_ops();
        assert_eq!(ops.get("measure"), Some(&2));
        assert_eq!(ops.get("barrier"), Some(&1));
        assert_eq!(ops.get("h"), None);
        assert_eq!(zz.creg(TOMOGRAPHY_REGISTER).map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_fit_computational_state() {
        // |1⟩: Z always reads 1, X and Y are unbiased
        let mut base = Circuit::new("hhl");
        let io = base.add_qreg("io", 1);
        let variants = state_tomography_circuits(&base, &io).unwrap();
        let results = records(&variants, |bases| match bases[0] {
            TomographyBasis::Z => Counts::from_pairs([("1", 100)]),
            _ => Counts::from_pairs([("0", 50), ("1", 50)]),
        });

        let rho = LinearInversionFitter::new().fit(&results, &variants).unwrap();
        assert!((rho[[0, 0]].re - 0.0).abs() < 1e-12);
        assert!((rho[[1, 1]].re - 1.0).abs() < 1e-12);
        assert!(rho[[0, 1]].norm() < 1e-12);
    }

    #[test]
    fn test_fit_plus_i_state() {
        // |+i⟩: Y reads 0 after Sdg·H
        let mut base = Circuit::new("hhl");
        let io = base.add_qreg("io", 1);
        let variants = state_tomography_circuits(&base, &io).unwrap();
        let results = records(&variants, |bases| match bases[0] {
            TomographyBasis::Y => Counts::from_pairs([("0", 10)]),
            _ => Counts::from_pairs([("0", 5), ("1", 5)]),
        });

        let rho = LinearInversionFitter::new().fit(&results, &variants).unwrap();
        // ρ = (I + Y)/2, ρ[1,0] = i/2
        assert!((rho[[1, 0]] - Complex64::new(0.0, 0.5)).norm() < 1e-12);
        assert!((rho[[0, 0]].re - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_bit_order_two_qubits() {
        // |q1 q0⟩ = |01⟩: io qubit 0 is 1
        let mut base = Circuit::new("hhl");
        let io = base.add_qreg("io", 2);
        let variants = state_tomography_circuits(&base, &io).unwrap();
        let results = records(&variants, |bases| {
            let b0 = if bases[0] == TomographyBasis::Z { '1' } else { '0' };
            let b1 = '0';
            Counts::from_pairs([(format!("{b1}{b0}"), 64)])
        });

        let rho = LinearInversionFitter::new().fit(&results, &variants).unwrap();
        let diag: Vec<f64> = (0..4).map(|i| rho[[i, i]].re).collect();
        assert!((diag[1] - 1.0).abs() < 1e-12, "{diag:?}");
        assert!(diag[0].abs() < 1e-12);
    }

    #[test]
    fn test_malformed_key_and_missing_experiment() {
        let mut base = Circuit::new("hhl");
        let io = base.add_qreg("io", 1);
        let variants = state_tomography_circuits(&base, &io).unwrap();

        let bad = records(&variants, |_| Counts::from_pairs([("1 0", 3)]));
        assert!(matches!(
            LinearInversionFitter::new().fit(&bad, &variants),
            Err(HhlError::MalformedCounts(_))
        ));

        let partial = records(&variants[..1], |_| Counts::from_pairs([("0", 1)]));
        assert!(matches!(
            LinearInversionFitter::new().fit(&partial, &variants),
            Err(HhlError::Hal(_))
        ));
    }
}
