// spectra-core/src/distance.rs
use nalgebra::{DMatrix, RowDVector};

/// Squared Euclidean distance ||a - b||² between two rows of a matrix.
pub fn squared_euclidean_rows(x: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    x.row(i)
        .iter()
        .zip(x.row(j).iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// Squared Euclidean distance between row `i` of `x` and a free-standing point.
pub fn squared_euclidean_to(x: &DMatrix<f64>, i: usize, p: &RowDVector<f64>) -> f64 {
    x.row(i)
        .iter()
        .zip(p.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// Gaussian kernel on a squared distance: w = exp(-d² / (2σ²)).
///
/// Caller guarantees `sigma > 0`. Divides by σ twice: σ² underflows to 0
/// for tiny σ and coincident points would give 0/0.
#[inline]
pub fn gaussian_kernel(d2: f64, sigma: f64) -> f64 {
    (-0.5 * (d2 / sigma / sigma)).exp()
}
