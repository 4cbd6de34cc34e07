//! Stage A: Gaussian affinity graph.
//!
//! Pipeline position: PointSet [m, d] → A [m, m] dense, symmetric,
//! non-negative, zero diagonal.
//!
//!   A[i][j] = exp(-||x_i − x_j||² / (2σ²))   for i ≠ j
//!   A[i][i] = 0
//!
//! Only the strict upper triangle is evaluated; each value is mirrored into
//! the lower triangle, so the result is exactly symmetric by construction.
//! The diagonal is written as 0 rather than exp(0) = 1: self-similarity is
//! not graph structure.

use log::{debug, info, trace};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::data::PointSet;
use crate::distance::{gaussian_kernel, squared_euclidean_rows};
use crate::error::{Result, SpectraError};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the affinity stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityConfig {
    /// Kernel bandwidth σ. Must be finite and > 0.
    /// Smaller σ → sparser effective graph, sharper component separation.
    pub sigma: f64,
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl AffinityConfig {
    pub fn with_sigma(sigma: f64) -> Self {
        Self { sigma }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(SpectraError::invalid(format!(
                "sigma must be finite and > 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output type
// ─────────────────────────────────────────────────────────────────────────────

/// Dense pairwise similarity matrix [m, m].
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityMatrix {
    matrix: DMatrix<f64>,
    sigma: f64,
}

impl AffinityMatrix {
    /// Wrap an externally built adjacency after checking the structural
    /// invariants (square, symmetric, non-negative, zero diagonal).
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self> {
        let n = matrix.nrows();
        if n != matrix.ncols() {
            return Err(SpectraError::invalid(format!(
                "affinity must be square, got {}x{}",
                n,
                matrix.ncols()
            )));
        }
        for i in 0..n {
            if matrix[(i, i)] != 0.0 {
                return Err(SpectraError::invalid(format!(
                    "affinity diagonal must be 0, got {} at ({}, {})",
                    matrix[(i, i)],
                    i,
                    i
                )));
            }
            for j in (i + 1)..n {
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                if !a.is_finite() || a < 0.0 || a != b {
                    return Err(SpectraError::invalid(format!(
                        "affinity must be finite, non-negative and symmetric at ({}, {}): {} vs {}",
                        i, j, a, b
                    )));
                }
            }
        }
        Ok(Self {
            matrix,
            sigma: f64::NAN,
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Bandwidth the matrix was built with (NaN when wrapped from outside).
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn summary(&self) -> String {
        let n = self.n_nodes();
        let pairs = n * n.saturating_sub(1) / 2;
        let mean = if pairs > 0 {
            self.matrix.sum() / (2 * pairs) as f64
        } else {
            0.0
        };
        format!(
            "AffinityMatrix: m={}, sigma={:.4}, mean_offdiag={:.4e}",
            n, self.sigma, mean
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage executor
// ─────────────────────────────────────────────────────────────────────────────

/// Stage A executor: builds the Gaussian affinity matrix from raw points.
pub struct AffinityStage {
    pub config: AffinityConfig,
}

impl AffinityStage {
    pub fn new(config: AffinityConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AffinityConfig::default())
    }

    /// Execute Stage A.
    ///
    /// Fails with `InvalidArgument` when σ ≤ 0 (or non-finite) or m < 2.
    pub fn execute(&self, points: &PointSet) -> Result<AffinityMatrix> {
        self.config.validate()?;
        let m = points.n_points();
        if m < 2 {
            return Err(SpectraError::invalid(format!(
                "affinity needs at least 2 points, got {}",
                m
            )));
        }
        let sigma = self.config.sigma;

        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  STAGE A: GAUSSIAN AFFINITY                           ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        info!(
            "  • m={}, d={}, sigma={:.4}",
            m,
            points.dim(),
            sigma
        );

        let x = points.as_matrix();
        let mut a = DMatrix::<f64>::zeros(m, m);

        // Upper triangle only, mirrored. Diagonal stays 0.
        for i in 0..m {
            for j in (i + 1)..m {
                let d2 = squared_euclidean_rows(x, i, j);
                let w = gaussian_kernel(d2, sigma);
                trace!("A[{}, {}]: d2={:.6e} w={:.6e}", i, j, d2, w);
                a[(i, j)] = w;
                a[(j, i)] = w;
            }
        }

        let out = AffinityMatrix { matrix: a, sigma };
        debug!("{}", out.summary());
        info!("  ✓ Affinity complete: {} pairs evaluated", m * (m - 1) / 2);

        Ok(out)
    }
}

/// Convenience wrapper: `build(points, sigma)`.
pub fn build(points: &PointSet, sigma: f64) -> Result<AffinityMatrix> {
    AffinityStage::new(AffinityConfig::with_sigma(sigma)).execute(points)
}
