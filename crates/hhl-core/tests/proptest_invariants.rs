//! Property-based tests for preprocessing and count postselection.

use hhl_core::extract::{ANCILLA_CREG, partition_counts, postselect, success_ratios};
use hhl_core::linalg::{conj_transpose, is_hermitian, truncate_matrix, truncate_vector};
use hhl_core::{Matrix, ValidatedProblem, Vector};
use hhl_hal::{Counts, ExecutionResult, ExperimentHeader, ExperimentResult};
use hhl_ir::Circuit;
use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;

/// Square matrix of size 1..=5 with a matching right-hand side.
fn arb_system() -> impl Strategy<Value = (Matrix, Vector)> {
    (1_usize..=5).prop_flat_map(|n| {
        (
            prop::collection::vec((-4.0_f64..4.0, -4.0_f64..4.0), n * n),
            prop::collection::vec((-4.0_f64..4.0, -4.0_f64..4.0), n),
        )
            .prop_map(move |(entries, rhs)| {
                let matrix = Array2::from_shape_vec(
                    (n, n),
                    entries
                        .into_iter()
                        .map(|(re, im)| Complex64::new(re, im))
                        .collect(),
                )
                .unwrap();
                let vector = rhs
                    .into_iter()
                    .map(|(re, im)| Complex64::new(re, im))
                    .collect();
                (matrix, vector)
            })
    })
}

/// Hermitian `M + Mᴴ` of dimension 1, 2, 4 or 8 with a matching right-hand side.
fn arb_hermitian_system() -> impl Strategy<Value = (Matrix, Vector)> {
    (0_u32..=3).prop_flat_map(|k| {
        let n = 1_usize << k;
        (
            prop::collection::vec((-4.0_f64..4.0, -4.0_f64..4.0), n * n),
            prop::collection::vec((-4.0_f64..4.0, -4.0_f64..4.0), n),
        )
            .prop_map(move |(entries, rhs)| {
                let m: Matrix = Array2::from_shape_vec(
                    (n, n),
                    entries
                        .into_iter()
                        .map(|(re, im)| Complex64::new(re, im))
                        .collect(),
                )
                .unwrap();
                let matrix = &m + &conj_transpose(&m);
                let vector = rhs
                    .into_iter()
                    .map(|(re, im)| Complex64::new(re, im))
                    .collect();
                (matrix, vector)
            })
    })
}

/// Counts over `n` io bits with the ancilla group first, as a sampler
/// would key a tomography variant.
fn arb_counts(n: usize) -> impl Strategy<Value = Vec<(bool, usize, u64)>> {
    prop::collection::vec((any::<bool>(), 0..1usize << n, 1_u64..500), 0..12)
}

fn tomography_record(n: usize, samples: &[(bool, usize, u64)]) -> ExecutionResult {
    let mut circuit = Circuit::new("hhl_tomo_Z");
    circuit.add_qreg("io", n as u32);
    circuit.add_creg("c", n as u32);
    circuit.add_creg(ANCILLA_CREG, 1);

    let mut counts = Counts::new();
    for (ancilla, io, hits) in samples {
        let key = format!("{} {io:0n$b}", u8::from(*ancilla));
        let total = counts.get(&key) + hits;
        counts.insert(key, total);
    }
    let shots = counts.total_shots() as u32;
    let experiment =
        ExperimentResult::with_counts(ExperimentHeader::from_circuit(&circuit), shots, counts);
    ExecutionResult::new("fake", "job", vec![experiment])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With both expansions enabled any square system is accepted and the
    /// result satisfies the phase-estimation invariants.
    #[test]
    fn expansions_restore_invariants((matrix, vector) in arb_system()) {
        let n = vector.len();
        let was_hermitian = is_hermitian(&matrix);
        let problem = ValidatedProblem::configure(matrix, vector.clone(), true, true).unwrap();

        prop_assert!(is_hermitian(problem.matrix()));
        prop_assert!(problem.dimension().is_power_of_two());
        prop_assert_eq!(problem.vector().len(), problem.dimension());
        prop_assert_eq!(problem.original_dimension(), n);
        prop_assert_eq!(problem.hermitian_embedded(), !was_hermitian);

        let expected = if was_hermitian { n } else { 2 * n };
        prop_assert_eq!(problem.dimension(), expected.next_power_of_two());
        prop_assert_eq!(problem.resized(), !expected.is_power_of_two());

        if !was_hermitian {
            prop_assert_eq!(problem.matrix(), &conj_transpose(problem.matrix()));
            // (conj(b), b) leads the expanded right-hand side.
            let conj: Vector = vector.mapv(|z| z.conj());
            prop_assert_eq!(problem.truncated_vector(), conj);
            prop_assert_eq!(problem.vector()[n], vector[0]);
        }
    }

    /// A Hermitian power-of-two system passes through both expansions untouched.
    #[test]
    fn hermitian_power_of_two_is_unchanged((matrix, vector) in arb_hermitian_system()) {
        prop_assert_eq!(&matrix, &conj_transpose(&matrix));
        let problem =
            ValidatedProblem::configure(matrix.clone(), vector.clone(), true, true).unwrap();

        prop_assert!(!problem.hermitian_embedded());
        prop_assert!(!problem.resized());
        prop_assert_eq!(problem.matrix(), &matrix);
        prop_assert_eq!(problem.vector(), &vector);
        prop_assert_eq!(problem.original_dimension(), vector.len());
    }

    /// Truncating twice to the same dimension changes nothing.
    #[test]
    fn truncation_is_idempotent((matrix, vector) in arb_system(), cut in 1_usize..=5) {
        let once = truncate_vector(&vector, cut);
        prop_assert_eq!(truncate_vector(&once, cut), once.clone());
        prop_assert_eq!(once.len(), cut.min(vector.len()));

        let once = truncate_matrix(&matrix, cut);
        prop_assert_eq!(truncate_matrix(&once, cut), once);
    }

    /// Postselection keeps exactly the success shots and rewrites nothing
    /// in the input.
    #[test]
    fn postselection_conserves_success_shots(n in 1_usize..=3, samples in arb_counts(3)) {
        let samples: Vec<_> = samples
            .into_iter()
            .map(|(a, io, hits)| (a, io % (1 << n), hits))
            .collect();
        let record = tomography_record(n, &samples);
        let before = record.clone();

        let counts = record.get_counts(0).unwrap();
        let partition = partition_counts(counts).unwrap();
        prop_assert_eq!(partition.total(), counts.total_shots());

        let selected = postselect(&record).unwrap();
        prop_assert_eq!(&record, &before);

        let kept = selected.get_counts(0).unwrap();
        prop_assert_eq!(kept.total_shots(), partition.success);
        for (key, _) in kept.iter() {
            prop_assert_eq!(key.len(), n);
            prop_assert!(!key.contains(' '));
        }
        let header = &selected.results[0].header;
        prop_assert_eq!(header.memory_slots as usize, n);
        prop_assert_eq!(header.creg_sizes.len(), 1);

        match success_ratios(&record) {
            Ok(ratios) => {
                prop_assert_eq!(ratios.len(), 1);
                prop_assert!((0.0..=1.0).contains(&ratios[0]));
            }
            Err(_) => prop_assert_eq!(partition.total(), 0),
        }
    }
}
