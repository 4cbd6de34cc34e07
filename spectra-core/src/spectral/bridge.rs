//! Dense linear-algebra capability used by the spectral stages.
//!
//! The eigensolver sits behind [`SymmetricEigenSolver`] so the decomposer
//! never depends on a concrete numeric backend. The default backend is
//! nalgebra's symmetric QR solver, which guarantees real eigenvalues and an
//! orthonormal eigenvector basis. A general non-symmetric solver must not be
//! plugged in here.

use log::trace;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Full eigendecomposition of a real symmetric matrix.
///
/// Implementations return eigenvalues in any order together with the
/// matching unit-norm eigenvectors as columns.
pub trait SymmetricEigenSolver: Send + Sync {
    fn symmetric_eigen(&self, matrix: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>);

    /// Get a display name for the solver
    fn name(&self) -> &str;
}

/// nalgebra `SymmetricEigen` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraEigenSolver;

impl SymmetricEigenSolver for NalgebraEigenSolver {
    fn symmetric_eigen(&self, matrix: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
        trace!(
            "nalgebra SymmetricEigen on {}x{}",
            matrix.nrows(),
            matrix.ncols()
        );
        let eigen = SymmetricEigen::new(matrix);
        (eigen.eigenvalues, eigen.eigenvectors)
    }

    fn name(&self) -> &str {
        "nalgebra::SymmetricEigen"
    }
}

/// Diagonal sandwich product `diag(f) · M · diag(f)`, computed entry-wise.
///
/// Reuses the storage of `m`.
pub fn scale_symmetric(mut m: DMatrix<f64>, f: &DVector<f64>) -> DMatrix<f64> {
    debug_assert_eq!(m.nrows(), f.len());
    debug_assert_eq!(m.ncols(), f.len());
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            m[(i, j)] *= f[i] * f[j];
        }
    }
    m
}

/// Largest absolute asymmetry |M[i][j] − M[j][i]|.
pub fn max_asymmetry(m: &DMatrix<f64>) -> f64 {
    let n = m.nrows();
    let mut worst = 0.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            worst = worst.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    worst
}
