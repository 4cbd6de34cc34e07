//! Stage C: Spectral decomposition and eigenvector selection.
//!
//! Pipeline position: L_sym [m, m] → eigenpairs (ascending) → embedding [m, K].
//!
//! The Laplacian is symmetric PSD, so a symmetric eigensolver is used and its
//! guarantees (real spectrum, orthonormal basis) are relied upon. Pairs are
//! sorted ascending by eigenvalue with a stable sort; equal eigenvalues keep
//! the solver's native order, so the basis inside a degenerate eigenspace is
//! backend-dependent. Only the spanned subspace is meaningful.
//!
//! If the similarity graph has C ≥ K connected components, the K smallest
//! eigenvalues are ≈ 0 and the embedding separates components trivially.
pub mod bridge;

use log::{debug, info, trace};
use nalgebra::{DMatrix, DVector, RowDVector};
use serde::{Deserialize, Serialize};

use crate::data::PointSet;
use crate::error::{Result, SpectraError};
use crate::laplacian::Laplacian;
use bridge::{max_asymmetry, NalgebraEigenSolver, SymmetricEigenSolver};

/// Tolerance for the symmetry precondition of the eigensolver.
pub const SYMMETRY_TOL: f64 = 1e-9;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Number of eigenvectors K kept in the embedding.
    pub n_components: usize,

    /// Rescale every embedding row to unit length before sub-clustering.
    /// Zero rows (isolated nodes) stay zero.
    pub normalize_rows: bool,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            n_components: 2,
            normalize_rows: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifacts
// ─────────────────────────────────────────────────────────────────────────────

/// All m eigenpairs of a Laplacian, ascending by eigenvalue.
#[derive(Debug, Clone)]
pub struct EigenPairs {
    values: Vec<f64>,
    vectors: DMatrix<f64>, // columns, same order as `values`
}

impl EigenPairs {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.values
    }

    /// Unit-norm eigenvector for the `k`-th smallest eigenvalue.
    pub fn eigenvector(&self, k: usize) -> DVector<f64> {
        self.vectors.column(k).into_owned()
    }

    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.vectors
    }

    /// Number of eigenvalues with |λ| ≤ tol; estimates the number of
    /// connected components of the similarity graph.
    pub fn near_zero_count(&self, tol: f64) -> usize {
        self.values.iter().take_while(|v| v.abs() <= tol).count()
    }

    /// Gap λ_k − λ_{k−1} right after the first `k` eigenvalues.
    /// `None` when `k` is 0 or ≥ m.
    pub fn spectral_gap(&self, k: usize) -> Option<f64> {
        if k == 0 || k >= self.values.len() {
            return None;
        }
        Some(self.values[k] - self.values[k - 1])
    }
}

/// The m×K matrix whose columns are the K lowest eigenvectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    matrix: DMatrix<f64>, // [m, K]
}

impl Embedding {
    pub fn n_points(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_components(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn row(&self, i: usize) -> RowDVector<f64> {
        self.matrix.row(i).into_owned()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Rows rescaled to unit Euclidean norm; zero rows are left as they are.
    pub fn row_normalized(&self) -> Embedding {
        let mut matrix = self.matrix.clone();
        for mut row in matrix.row_iter_mut() {
            let norm = row.norm();
            if norm > 0.0 {
                row /= norm;
            }
        }
        Embedding { matrix }
    }

    /// View the embedding as a point set so the sub-clusterer can consume it.
    pub fn to_point_set(&self) -> PointSet {
        PointSet::from_matrix(self.matrix.clone())
    }
}

/// Output of Stage C.
#[derive(Debug, Clone)]
pub struct SpectralOutput {
    pub pairs: EigenPairs,
    pub embedding: Embedding,
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Eigendecompose with the default nalgebra backend.
///
/// # Panics
/// If the Laplacian is not symmetric within [`SYMMETRY_TOL`] or the solver
/// yields non-finite eigenvalues. Both mean an upstream invariant broke.
pub fn decompose(l: &Laplacian) -> EigenPairs {
    decompose_with(l, &NalgebraEigenSolver)
}

/// Eigendecompose with an explicit backend; see [`decompose`].
pub fn decompose_with(l: &Laplacian, solver: &dyn SymmetricEigenSolver) -> EigenPairs {
    let m = l.as_matrix();
    let asym = max_asymmetry(m);
    assert!(
        asym <= SYMMETRY_TOL,
        "Laplacian is not symmetric (max |L_ij - L_ji| = {:e}); refusing to run a symmetric eigensolver",
        asym
    );

    debug!(
        "Decomposing {}x{} Laplacian with {}",
        m.nrows(),
        m.ncols(),
        solver.name()
    );
    let (values, vectors) = solver.symmetric_eigen(m.clone());
    assert!(
        values.iter().all(|v| v.is_finite()),
        "eigensolver returned non-finite eigenvalues"
    );

    // Ascending, stable: ties keep solver order.
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    let sorted_vectors = vectors.select_columns(order.iter());

    trace!("eigenvalues (ascending): {:?}", sorted_values);

    EigenPairs {
        values: sorted_values,
        vectors: sorted_vectors,
    }
}

/// Take the first `k` eigenvectors as an m×k embedding.
///
/// Fails with `InvalidArgument` when `k < 1` or `k > m`.
pub fn select(pairs: &EigenPairs, k: usize) -> Result<Embedding> {
    let m = pairs.len();
    if k < 1 || k > m {
        return Err(SpectraError::invalid(format!(
            "number of components must be in [1, {}], got {}",
            m, k
        )));
    }
    Ok(Embedding {
        matrix: pairs.vectors.columns(0, k).into_owned(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage executor
// ─────────────────────────────────────────────────────────────────────────────

/// Stage C executor: eigendecomposition + K-lowest selection.
pub struct SpectralStage {
    pub config: SpectralConfig,
    solver: Box<dyn SymmetricEigenSolver>,
}

impl SpectralStage {
    pub fn new(config: SpectralConfig) -> Self {
        Self {
            config,
            solver: Box::new(NalgebraEigenSolver),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SpectralConfig::default())
    }

    /// Swap the eigensolver backend.
    pub fn with_solver(mut self, solver: Box<dyn SymmetricEigenSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Execute Stage C.
    pub fn execute(&self, l: &Laplacian) -> Result<SpectralOutput> {
        let k = self.config.n_components;
        let m = l.n_nodes();
        if k < 1 || k > m {
            return Err(SpectraError::invalid(format!(
                "number of components must be in [1, {}], got {}",
                m, k
            )));
        }

        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  STAGE C: SPECTRAL EMBEDDING                          ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        info!(
            "  • m={}, K={}, normalize_rows={}, solver={}",
            m,
            k,
            self.config.normalize_rows,
            self.solver.name()
        );

        let pairs = decompose_with(l, self.solver.as_ref());
        let mut embedding = select(&pairs, k)?;
        if self.config.normalize_rows {
            debug!("Row-normalising embedding");
            embedding = embedding.row_normalized();
        }

        info!(
            "  ✓ K smallest eigenvalues: {:?}",
            &pairs.eigenvalues()[..k]
        );
        if let Some(gap) = pairs.spectral_gap(k) {
            debug!("  spectral gap after K: {:.6e}", gap);
        }

        Ok(SpectralOutput { pairs, embedding })
    }
}
