//! Dense complex linear algebra used by preprocessing and rescaling.

use ndarray::{Array1, Array2, s};
use num_complex::Complex64;

/// Complex square matrix.
pub type Matrix = Array2<Complex64>;
/// Complex column vector.
pub type Vector = Array1<Complex64>;

/// Relative tolerance of [`allclose`].
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance of [`allclose`].
pub const ATOL: f64 = 1e-8;

/// Conjugate transpose.
pub fn conj_transpose(m: &Matrix) -> Matrix {
    m.t().mapv(|z| z.conj())
}

/// Element-wise `|a - b| <= ATOL + RTOL * |b|`; shapes must agree.
pub fn allclose(a: &Matrix, b: &Matrix) -> bool {
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).norm() <= ATOL + RTOL * y.norm())
}

/// Whether `m` equals its conjugate transpose within tolerance.
pub fn is_hermitian(m: &Matrix) -> bool {
    m.is_square() && allclose(m, &conj_transpose(m))
}

/// Euclidean norm.
pub fn norm(v: &Vector) -> f64 {
    v.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt()
}

/// `⟨v|v⟩`, kept complex.
pub fn inner_self(v: &Vector) -> Complex64 {
    v.iter().map(|z| z.conj() * z).sum()
}

/// Base-two logarithm of a power of two.
pub fn log2_exact(n: usize) -> Option<u32> {
    n.is_power_of_two().then(|| n.trailing_zeros())
}

/// First `dim` entries of `v`.
pub fn truncate_vector(v: &Vector, dim: usize) -> Vector {
    v.slice(s![..dim.min(v.len())]).to_owned()
}

/// Leading `dim x dim` block of `m`.
pub fn truncate_matrix(m: &Matrix, dim: usize) -> Matrix {
    let rows = dim.min(m.nrows());
    let cols = dim.min(m.ncols());
    m.slice(s![..rows, ..cols]).to_owned()
}

/// Build a matrix from row-major complex rows.
///
/// Returns `None` when rows have unequal lengths.
pub fn matrix_from_rows(rows: &[Vec<Complex64>]) -> Option<Matrix> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return None;
    }
    let flat: Vec<Complex64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((nrows, ncols), flat).ok()
}
