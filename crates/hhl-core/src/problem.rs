//! Problem input and preprocessing.
//!
//! [`ValidatedProblem::configure`] forces a linear system into the shape
//! phase estimation needs:
//!
//! ```text
//!   (A, b) ──→ shape checks ──→ [auto_hermitian] ──→ [auto_resize] ──→ re-check
//!              mismatch,          [[0, Aᴴ],[A, 0]]    identity pad      Hermitian,
//!              non-square         (conj(b), b)        zero pad          2^n
//! ```
//!
//! The original dimension is recorded before any expansion so every output
//! can be truncated back to the caller's problem size.

use std::path::Path;

use ndarray::{Array1, Array2, s};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::error::{HhlError, HhlResult};
use crate::linalg::{
    Matrix, Vector, conj_transpose, is_hermitian, log2_exact, matrix_from_rows, truncate_matrix,
    truncate_vector,
};

/// One matrix or vector entry: a real number or a `[re, im]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Real entry.
    Real(f64),
    /// Complex entry as `[re, im]`.
    Complex([f64; 2]),
}

impl Entry {
    /// The entry as a complex number.
    pub fn value(self) -> Complex64 {
        match self {
            Entry::Real(re) => Complex64::new(re, 0.0),
            Entry::Complex([re, im]) => Complex64::new(re, im),
        }
    }
}

impl From<f64> for Entry {
    fn from(re: f64) -> Self {
        Entry::Real(re)
    }
}

impl From<Complex64> for Entry {
    fn from(z: Complex64) -> Self {
        if z.im == 0.0 {
            Entry::Real(z.re)
        } else {
            Entry::Complex([z.re, z.im])
        }
    }
}

/// A linear system `A x = b` as supplied by the caller.
///
/// ```yaml
/// matrix:
///   - [1.0, 0.5]
///   - [0.5, 1.0]
/// vector: [1.0, [0.0, 1.0]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSystemInput {
    /// Row-major matrix.
    pub matrix: Vec<Vec<Entry>>,
    /// Right-hand side.
    pub vector: Vec<Entry>,
}

impl LinearSystemInput {
    /// A real-valued system.
    pub fn real(matrix: Vec<Vec<f64>>, vector: Vec<f64>) -> Self {
        Self {
            matrix: matrix
                .into_iter()
                .map(|row| row.into_iter().map(Entry::from).collect())
                .collect(),
            vector: vector.into_iter().map(Entry::from).collect(),
        }
    }

    /// Load from a YAML file, or JSON when the extension is `.json`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> HhlResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let input = if is_json {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            serde_yaml_ng::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?
        };
        Ok(input)
    }

    /// Convert to dense arrays.
    pub fn to_arrays(&self) -> HhlResult<(Matrix, Vector)> {
        let rows: Vec<Vec<Complex64>> = self
            .matrix
            .iter()
            .map(|row| row.iter().map(|e| e.value()).collect())
            .collect();
        let matrix = matrix_from_rows(&rows).ok_or_else(|| {
            HhlError::MalformedInput("matrix rows have different lengths".to_string())
        })?;
        let vector: Vector = self.vector.iter().map(|e| e.value()).collect();
        Ok((matrix, vector))
    }
}

/// A linear system that satisfies the phase-estimation invariants.
///
/// Immutable once built: the matrix is Hermitian, its dimension is `2^n`,
/// and the vector has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProblem {
    matrix: Matrix,
    vector: Vector,
    original_dimension: usize,
    hermitian_embedded: bool,
    resized: bool,
}

impl ValidatedProblem {
    /// Validate `(matrix, vector)`, expanding it when the flags allow.
    ///
    /// # Errors
    ///
    /// - [`HhlError::MissingInput`] when both are empty
    /// - [`HhlError::DimensionMismatch`] when `len(vector) != rows`
    /// - [`HhlError::NonSquareMatrix`] when `rows != cols`
    /// - [`HhlError::NotHermitian`] / [`HhlError::InvalidDimension`] when an
    ///   invariant still fails after the enabled expansions
    pub fn configure(
        matrix: Matrix,
        vector: Vector,
        auto_hermitian: bool,
        auto_resize: bool,
    ) -> HhlResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows == 0 && vector.is_empty() {
            return Err(HhlError::MissingInput);
        }
        if vector.len() != rows {
            return Err(HhlError::DimensionMismatch {
                vector_len: vector.len(),
                matrix_rows: rows,
            });
        }
        if rows != cols {
            return Err(HhlError::NonSquareMatrix { rows, cols });
        }

        let original_dimension = vector.len();
        let (mut matrix, mut vector) = (matrix, vector);

        let mut hermitian_embedded = false;
        if auto_hermitian && !is_hermitian(&matrix) {
            (matrix, vector) = hermitian_embedding(&matrix, &vector);
            hermitian_embedded = true;
            debug!(dimension = matrix.nrows(), "embedded non-Hermitian matrix");
        }

        let mut resized = false;
        if auto_resize && !matrix.nrows().is_power_of_two() {
            (matrix, vector) = pad_to_power_of_two(&matrix, &vector);
            resized = true;
            debug!(dimension = matrix.nrows(), "padded matrix to a power of two");
        }

        if !is_hermitian(&matrix) {
            return Err(HhlError::NotHermitian);
        }
        if log2_exact(matrix.nrows()).is_none() {
            return Err(HhlError::InvalidDimension(matrix.nrows()));
        }

        Ok(Self {
            matrix,
            vector,
            original_dimension,
            hermitian_embedded,
            resized,
        })
    }

    /// Validate a [`LinearSystemInput`]; `None` is [`HhlError::MissingInput`].
    pub fn from_input(
        input: Option<&LinearSystemInput>,
        auto_hermitian: bool,
        auto_resize: bool,
    ) -> HhlResult<Self> {
        let input = input.ok_or(HhlError::MissingInput)?;
        let (matrix, vector) = input.to_arrays()?;
        Self::configure(matrix, vector, auto_hermitian, auto_resize)
    }

    /// The (possibly expanded) matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// The (possibly expanded) right-hand side.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Dimension after expansion, always `2^n`.
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of io qubits, `log2(dimension)`.
    pub fn num_qubits(&self) -> usize {
        self.dimension().trailing_zeros() as usize
    }

    /// Vector length before any expansion.
    pub fn original_dimension(&self) -> usize {
        self.original_dimension
    }

    /// Whether the Hermitian embedding was applied.
    pub fn hermitian_embedded(&self) -> bool {
        self.hermitian_embedded
    }

    /// Whether identity padding was applied.
    pub fn resized(&self) -> bool {
        self.resized
    }

    /// The matrix cut back to the original dimension.
    pub fn truncated_matrix(&self) -> Matrix {
        truncate_matrix(&self.matrix, self.original_dimension)
    }

    /// The vector cut back to the original dimension.
    pub fn truncated_vector(&self) -> Vector {
        truncate_vector(&self.vector, self.original_dimension)
    }
}

/// `[[0, Aᴴ],[A, 0]]` with right-hand side `(conj(b), b)`.
fn hermitian_embedding(matrix: &Matrix, vector: &Vector) -> (Matrix, Vector) {
    let n = matrix.nrows();
    let mut embedded = Array2::zeros((2 * n, 2 * n));
    embedded
        .slice_mut(s![..n, n..])
        .assign(&conj_transpose(matrix));
    embedded.slice_mut(s![n.., ..n]).assign(matrix);

    let rhs: Vector = vector
        .iter()
        .map(Complex64::conj)
        .chain(vector.iter().copied())
        .collect();
    (embedded, rhs)
}

/// Embed into the next power-of-two identity; zero-pad the vector.
fn pad_to_power_of_two(matrix: &Matrix, vector: &Vector) -> (Matrix, Vector) {
    let n = matrix.nrows();
    let target = n.next_power_of_two();
    let mut padded = Array2::eye(target);
    padded.slice_mut(s![..n, ..n]).assign(matrix);

    let mut rhs = Array1::zeros(target);
    rhs.slice_mut(s![..n]).assign(vector);
    (padded, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_dimension_mismatch_checked_first() {
        // Also non-square; the length check wins.
        let m = Array2::from_elem((2, 3), c(1.0));
        let v = array![c(1.0), c(0.0), c(0.0)];
        assert!(matches!(
            ValidatedProblem::configure(m, v, true, true),
            Err(HhlError::DimensionMismatch {
                vector_len: 3,
                matrix_rows: 2
            })
        ));
    }

    #[test]
    fn test_non_square() {
        let m = Array2::from_elem((2, 3), c(1.0));
        let v = array![c(1.0), c(0.0)];
        assert!(matches!(
            ValidatedProblem::configure(m, v, true, true),
            Err(HhlError::NonSquareMatrix { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            ValidatedProblem::from_input(None, false, false),
            Err(HhlError::MissingInput)
        ));
        assert!(matches!(
            ValidatedProblem::configure(Array2::zeros((0, 0)), Array1::zeros(0), false, false),
            Err(HhlError::MissingInput)
        ));
    }

    #[test]
    fn test_hermitian_embedding_layout() {
        let m = array![[c(1.0), c(2.0)], [c(3.0), c(4.0)]];
        let v = array![Complex64::new(1.0, 1.0), c(2.0)];
        let p = ValidatedProblem::configure(m, v, true, false).unwrap();

        assert!(p.hermitian_embedded());
        assert_eq!(p.dimension(), 4);
        assert_eq!(p.original_dimension(), 2);
        assert_eq!(p.matrix()[[0, 3]], c(3.0));
        assert_eq!(p.matrix()[[3, 0]], c(3.0));
        assert_eq!(p.matrix()[[2, 1]], c(2.0));
        assert_eq!(p.matrix()[[1, 2]], c(2.0));
        assert_eq!(p.matrix()[[0, 0]], c(0.0));
        assert_eq!(p.matrix(), &conj_transpose(p.matrix()));
        assert_eq!(p.vector()[0], Complex64::new(1.0, -1.0));
        assert_eq!(p.vector()[2], Complex64::new(1.0, 1.0));
    }

    #[test]
    fn test_resize_pads_identity() {
        let m = array![[c(1.0), c(0.0), c(0.0)], [c(0.0), c(2.0), c(0.0)], [c(0.0), c(0.0), c(1.0)]];
        let v = array![c(1.0), c(1.0), c(1.0)];
        let p = ValidatedProblem::configure(m, v, false, true).unwrap();

        assert!(p.resized());
        assert_eq!(p.dimension(), 4);
        assert_eq!(p.num_qubits(), 2);
        assert_eq!(p.matrix()[[3, 3]], c(1.0));
        assert_eq!(p.vector()[3], c(0.0));
        assert_eq!(p.truncated_vector().len(), 3);
    }

    #[test]
    fn test_input_parses_complex_entries() {
        let yaml = "matrix:\n  - [1.0, [0.0, -1.0]]\n  - [[0.0, 1.0], 2]\nvector: [1, 0]\n";
        let input: LinearSystemInput = serde_yaml_ng::from_str(yaml).unwrap();
        let (m, v) = input.to_arrays().unwrap();
        assert_eq!(m[[0, 1]], Complex64::new(0.0, -1.0));
        assert_eq!(m[[1, 1]], c(2.0));
        assert_eq!(v.len(), 2);

        let p = ValidatedProblem::from_input(Some(&input), false, false).unwrap();
        assert!(!p.hermitian_embedded());
    }

    #[test]
    fn test_ragged_input() {
        let input = LinearSystemInput::real(vec![vec![1.0, 0.0], vec![1.0]], vec![1.0, 0.0]);
        assert!(matches!(input.to_arrays(), Err(HhlError::MalformedInput(_))));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.json");
        std::fs::write(&path, r#"{"matrix": [[2.0]], "vector": [[1.0, 0.5]]}"#).unwrap();

        let input = LinearSystemInput::from_file(&path).unwrap();
        assert_eq!(input.vector[0].value(), Complex64::new(1.0, 0.5));
        assert!(matches!(
            LinearSystemInput::from_file(dir.path().join("missing.yaml")),
            Err(HhlError::Config(ConfigError::IoError(_)))
        ));
    }
}
